//! Ebb Test Harness - doubles for sync-engine validation
//!
//! This crate provides a scripted remote-service double: per-call replies
//! queued ahead of time, a log of every call the engine actually made, and a
//! gate for holding calls open while a test probes overlapping drains.

pub mod remote;

pub use remote::*;
