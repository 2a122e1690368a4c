//! Ebb Engine - queue reconciliation
//!
//! This crate implements the Reconciliation Engine:
//! - The drain loop over the durable operation queue
//! - Per-kind success and abandonment handling
//! - Coalescing of contiguous counter runs
//! - Server-id adoption and duplicate guarding in local state

pub mod coalesce;
pub mod engine;
pub mod patch;

pub use coalesce::*;
pub use engine::*;
pub use patch::*;
