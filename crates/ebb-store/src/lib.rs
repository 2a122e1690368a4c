//! Ebb Store - local state underneath the sync engine
//!
//! This crate provides the two stores the reconciliation engine works
//! against:
//! - The Operation Record Store: the durable, insertion-ordered queue of
//!   not-yet-confirmed mutations
//! - The Domain State Store: the canonical local copy of workspaces plus the
//!   current-workspace pointer

pub mod domain;
pub mod ops;
pub mod sqlite;

pub use domain::*;
pub use ops::*;
pub use sqlite::*;
