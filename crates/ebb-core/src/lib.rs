//! Ebb Core - Fundamental types and primitives
//!
//! This crate defines the core types used throughout the Ebb sync engine:
//! - Identifiers (WorkspaceId, TodoId, GoalId, RecordId)
//! - Domain aggregates (Workspace, Todo, Goal)
//! - Operation records (the durable offline mutation queue entries)
//! - Error types

pub mod domain;
pub mod error;
pub mod id;
pub mod record;

pub use domain::*;
pub use error::*;
pub use id::*;
pub use record::*;
