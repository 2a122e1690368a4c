//! Ebb Remote - typed clients for the authoritative remote service
//!
//! One async call per operation kind, each validated against a strict
//! per-kind response schema at this boundary. The reconciliation engine only
//! ever sees typed success/failure results, never raw response shapes.

pub mod http;
pub mod service;

pub use http::*;
pub use service::*;
