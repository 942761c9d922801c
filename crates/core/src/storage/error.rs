use thiserror::Error;

use super::super::cache::CacheError;

/// Errors that can occur when constructing a date window.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    #[error("Invalid date range: start must be before or equal to end")]
    InvalidRange,
    #[error("Date range out of bounds")]
    OutOfBounds,
}

/// Errors that can occur during attendance store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("{entity_type} already exists: {id}")]
    AlreadyExists {
        entity_type: &'static str,
        id: String,
    },
    #[error("Friday {id} is full ({max_guests} guests)")]
    CapacityReached { id: String, max_guests: usize },
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl RepositoryError {
    pub fn friend_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Friend",
            id: id.into(),
        }
    }

    pub fn friday_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Friday",
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<CacheError> for RepositoryError {
    fn from(err: CacheError) -> Self {
        match err {
            CacheError::NotFound(key) => Self::NotFound {
                entity_type: "CacheEntry",
                id: key,
            },
            CacheError::Refresh(message) => Self::QueryFailed(message),
        }
    }
}

/// Result type for attendance store operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
