//! Ebb Runtime - the pieces around the reconciliation engine
//!
//! This crate wires the engine into a running client:
//! - The trigger scheduler: periodic drains plus a connectivity-regained
//!   drain
//! - The local mutation path: optimistic domain patches paired with durable
//!   operation records
//! - Node wiring and tracing setup

pub mod actions;
pub mod node;
pub mod scheduler;
pub mod telemetry;

pub use actions::*;
pub use node::*;
pub use scheduler::*;
pub use telemetry::*;
