//! Error types for the graph crate

use thiserror::Error;

/// Result type alias using GraphError
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors that can occur while interpreting graph data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A node type name that is not one of the known categories
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    /// An editor node type that does not carry the editor suffix
    #[error("Invalid editor node type '{0}': expected a category followed by 'Node'")]
    InvalidEditorType(String),

    /// A connection handle name that is not a known port
    #[error("Unknown handle: {0}")]
    UnknownHandle(String),
}
