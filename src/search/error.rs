//! Error types for search engine operations

use crate::error::AppError;

/// Result type for search engine operations
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while talking to the search engine
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Engine could not be reached
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Index not found
    #[error("Index not found: {0}")]
    IndexNotFound(String),

    /// Index initialization failed
    #[error("Index initialization failed: {0}")]
    IndexInitFailed(String),

    /// Document not found
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// Search execution failed
    #[error("Search execution failed: {0}")]
    SearchFailed(String),

    /// Document indexing failed
    #[error("Document indexing failed: {0}")]
    IndexingFailed(String),

    /// Document update failed
    #[error("Document update failed: {0}")]
    UpdateFailed(String),

    /// Document deletion failed
    #[error("Document deletion failed: {0}")]
    DeletionFailed(String),

    /// Engine answered with a body we could not interpret
    #[error("Unexpected engine response: {0}")]
    UnexpectedResponse(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            EngineError::ConnectionFailed(err.to_string())
        } else if err.is_decode() {
            EngineError::UnexpectedResponse(err.to_string())
        } else {
            EngineError::SearchFailed(err.to_string())
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::UnexpectedResponse(err.to_string())
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::DocumentNotFound(id) => AppError::NotFound(format!("Board {}", id)),
            EngineError::ConnectionFailed(msg) => AppError::EngineUnavailable(msg),
            EngineError::InvalidConfiguration(msg) => AppError::Configuration(msg),
            _ => AppError::Engine(err.to_string()),
        }
    }
}
