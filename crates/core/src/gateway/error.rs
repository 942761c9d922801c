use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when talking to the remote calendar.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The remote calendar has no event with this id. Callers may create it and retry.
    #[error("Event not found: {0}")]
    EventNotFound(String),
    /// An event with this id already exists, typically created by a concurrent caller.
    #[error("Event already exists: {0}")]
    EventAlreadyExists(String),
    #[error("{email} is not invited to event {event_id}")]
    NotInvited { event_id: String, email: String },
    #[error("{operation} timed out after {duration:?}")]
    Timeout {
        operation: &'static str,
        duration: Duration,
    },
    #[error("Request failed: {0}")]
    Request(String),
    #[error("Calendar API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl GatewayError {
    pub fn is_event_not_found(&self) -> bool {
        matches!(self, Self::EventNotFound(_))
    }
}

/// Result type for calendar gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
