use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache entry not found: {0}")]
    NotFound(String),
    #[error("Cache refresh failed: {0}")]
    Refresh(String),
}

/// Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
