//! Error types for the workflow store

use thiserror::Error;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors surfaced by store operations that talk to the outside world
#[derive(Debug, Error)]
pub enum StoreError {
    /// The persistence collaborator rejected or failed a request
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A workflow id that cannot be used as a storage key
    #[error("Invalid workflow id: {0}")]
    InvalidId(String),

    /// The store configuration file is not valid
    #[error("Failed to parse config: {0}")]
    ConfigParse(serde_json::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Create a persistence error with a message
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }
}
