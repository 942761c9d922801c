use rsvp_core::cache::CacheError;
use rsvp_core::friday::FridayIdError;
use rsvp_core::gateway::GatewayError;
use rsvp_core::storage::{repository_error_to_status_code, RepositoryError};
use thiserror::Error;

/// Errors surfaced by the attendance engine.
///
/// `FridayIsFull`, `NotFound` and `NotAllowed` stay distinct so callers can
/// render "full", "unknown" and "forbidden" differently.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },
    #[error("Calendar event not found: {0}")]
    EventNotFound(String),
    #[error("{email} is not invited to Friday {friday}")]
    NotInvited { friday: String, email: String },
    #[error("Friday {0} is full")]
    FridayIsFull(String),
    #[error("Not allowed: {0}")]
    NotAllowed(String),
    #[error("Invalid Friday id: {0}")]
    InvalidFridayId(#[from] FridayIdError),
    #[error("No year in review for {0}")]
    InvalidYear(i32),
    #[error("Storage failure: {0}")]
    StorageFailure(RepositoryError),
    #[error("Calendar failure: {0}")]
    GatewayFailure(GatewayError),
}

impl From<RepositoryError> for EngineError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity_type, id } => Self::NotFound { entity_type, id },
            RepositoryError::CapacityReached { id, .. } => Self::FridayIsFull(id),
            other => Self::StorageFailure(other),
        }
    }
}

impl From<CacheError> for EngineError {
    fn from(err: CacheError) -> Self {
        RepositoryError::from(err).into()
    }
}

impl From<GatewayError> for EngineError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::EventNotFound(id) => Self::EventNotFound(id),
            GatewayError::NotInvited { event_id, email } => Self::NotInvited {
                friday: event_id,
                email,
            },
            other => Self::GatewayFailure(other),
        }
    }
}

impl EngineError {
    pub fn not_allowed(reason: impl Into<String>) -> Self {
        Self::NotAllowed(reason.into())
    }

    /// HTTP status code for the excluded web layer.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } | Self::EventNotFound(_) => 404,
            Self::NotInvited { .. } | Self::FridayIsFull(_) => 409,
            Self::NotAllowed(_) => 403,
            Self::InvalidFridayId(_) | Self::InvalidYear(_) => 400,
            Self::StorageFailure(err) => repository_error_to_status_code(err),
            Self::GatewayFailure(GatewayError::Timeout { .. }) => 504,
            Self::GatewayFailure(_) => 502,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
