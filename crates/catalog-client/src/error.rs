//! Error types for the catalog client

use thiserror::Error;

/// Catalog client error
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Network unreachable, timeout, or a broken response stream
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store answered with a non-success status
    #[error("Remote error {status}: {message}")]
    Remote { status: u16, message: String },

    /// Category not found
    #[error("Category not found: {0}")]
    NotFound(String),

    /// Client-side precondition failed, nothing was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// Response body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::InvalidResponse(e.to_string())
    }
}

impl CatalogError {
    /// True when the failure happened before any request was sent
    pub fn is_local(&self) -> bool {
        matches!(self, CatalogError::Validation(_))
    }
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;
