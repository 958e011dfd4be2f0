//! Error types for the console core

use catalog_client::CatalogError;
use thiserror::Error;

/// Result type for console operations
pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Console error types
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// Network unreachable or timed out
    #[error("Network error: {0}")]
    Transport(String),

    /// The store rejected the request
    #[error("Store error {status}: {message}")]
    Remote { status: u16, message: String },

    /// Category not found
    #[error("Category not found: {0}")]
    NotFound(String),

    /// Precondition violated before any network call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation attempted against a node of the wrong kind
    #[error("Invalid target {id}: {reason}")]
    InvalidTarget { id: String, reason: String },

    /// A draft is already open for another category
    #[error("A draft is already open for category {open}")]
    DraftConflict { open: String },

    /// The component is in the middle of a request that cannot be interrupted
    #[error("Operation in progress: {0}")]
    Busy(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ConsoleError {
    pub(crate) fn invalid_target(id: &str, reason: impl Into<String>) -> Self {
        ConsoleError::InvalidTarget {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<CatalogError> for ConsoleError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Transport(e) => ConsoleError::Transport(e.to_string()),
            CatalogError::Remote { status, message } => ConsoleError::Remote { status, message },
            CatalogError::NotFound(id) => ConsoleError::NotFound(id),
            CatalogError::Validation(msg) => ConsoleError::Validation(msg),
            CatalogError::InvalidResponse(msg) => ConsoleError::Remote {
                status: 200,
                message: format!("unreadable response: {}", msg),
            },
        }
    }
}

impl From<toml::de::Error> for ConsoleError {
    fn from(err: toml::de::Error) -> Self {
        ConsoleError::Config(err.to_string())
    }
}
