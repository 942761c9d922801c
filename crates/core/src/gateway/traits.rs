use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{CalendarEvent, Result};

/// The remote calendar, as seen by the invitation workflow and reconciliation.
///
/// A missing event is always reported as [`super::GatewayError::EventNotFound`]
/// so callers can tell "doesn't exist yet" from a transient failure.
#[async_trait]
pub trait CalendarGateway: Send + Sync {
    async fn get_event(&self, event_id: &str) -> Result<CalendarEvent>;

    /// Creates a remote event using `event.id` as its identifier.
    async fn create_event(&self, event: &CalendarEvent) -> Result<()>;

    /// Adds `email` as an attendee with status `needsAction`.
    ///
    /// No-op if already invited and not declined. A declined attendee is
    /// reset to `needsAction`.
    async fn invite_to_event(&self, event_id: &str, email: &str, name: &str) -> Result<()>;

    /// Marks `email` declined. Fails with `NotInvited` if not an attendee.
    async fn decline_event(&self, event_id: &str, email: &str) -> Result<()>;

    /// Up to `limit` events starting from now, ordered by start time.
    async fn list_events(&self, limit: usize) -> Result<Vec<CalendarEvent>>;

    /// Up to `limit` events in `[start, end]`, ordered by start time.
    async fn list_events_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<CalendarEvent>>;

    async fn cancel_event(&self, event_id: &str) -> Result<()>;

    async fn activate_event(&self, event_id: &str) -> Result<()>;
}
