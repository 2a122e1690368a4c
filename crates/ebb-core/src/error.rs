//! Error types for the Ebb sync engine

use thiserror::Error;

/// Errors surfaced by the sync engine and its collaborators
#[derive(Error, Debug)]
pub enum EbbError {
    // Store errors
    #[error("store io: {0}")]
    StoreIo(String),

    #[error("store sql: {0}")]
    StoreSql(String),

    #[error("corrupt record {id}: {detail}")]
    CorruptRecord { id: String, detail: String },

    // Remote errors
    #[error("transport: {0}")]
    Transport(String),

    #[error("{operation} rejected by remote: success={discriminant:?}")]
    Rejected {
        operation: &'static str,
        discriminant: Option<String>,
    },

    #[error("{operation} response missing field {field:?}")]
    MalformedResponse {
        operation: &'static str,
        field: &'static str,
    },

    #[error("invalid remote endpoint: {0}")]
    InvalidEndpoint(String),
}

impl EbbError {
    /// True for errors raised at the remote-service boundary.
    ///
    /// The engine treats every remote failure classification identically for
    /// retry-budget purposes; this only matters for reporting.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            EbbError::Transport(_)
                | EbbError::Rejected { .. }
                | EbbError::MalformedResponse { .. }
        )
    }
}

/// Result type for Ebb operations
pub type EbbResult<T> = Result<T, EbbError>;
