//! Per-call timeout decorator for calendar gateways.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use rsvp_core::gateway::{CalendarEvent, CalendarGateway, GatewayError, Result};

/// Bounds every call of the wrapped gateway.
///
/// An expired call fails with [`GatewayError::Timeout`]; the request itself is dropped.
pub struct TimeoutGateway<G> {
    inner: G,
    timeout: Duration,
}

impl<G> TimeoutGateway<G>
where
    G: CalendarGateway,
{
    pub fn new(inner: G, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T>> + Send,
    ) -> Result<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(operation, timeout = ?self.timeout, "Calendar call timed out");
                Err(GatewayError::Timeout {
                    operation,
                    duration: self.timeout,
                })
            }
        }
    }
}

#[async_trait]
impl<G> CalendarGateway for TimeoutGateway<G>
where
    G: CalendarGateway,
{
    async fn get_event(&self, event_id: &str) -> Result<CalendarEvent> {
        self.bounded("get_event", self.inner.get_event(event_id)).await
    }

    async fn create_event(&self, event: &CalendarEvent) -> Result<()> {
        self.bounded("create_event", self.inner.create_event(event)).await
    }

    async fn invite_to_event(&self, event_id: &str, email: &str, name: &str) -> Result<()> {
        self.bounded(
            "invite_to_event",
            self.inner.invite_to_event(event_id, email, name),
        )
        .await
    }

    async fn decline_event(&self, event_id: &str, email: &str) -> Result<()> {
        self.bounded("decline_event", self.inner.decline_event(event_id, email))
            .await
    }

    async fn list_events(&self, limit: usize) -> Result<Vec<CalendarEvent>> {
        self.bounded("list_events", self.inner.list_events(limit)).await
    }

    async fn list_events_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<CalendarEvent>> {
        self.bounded(
            "list_events_between",
            self.inner.list_events_between(start, end, limit),
        )
        .await
    }

    async fn cancel_event(&self, event_id: &str) -> Result<()> {
        self.bounded("cancel_event", self.inner.cancel_event(event_id)).await
    }

    async fn activate_event(&self, event_id: &str) -> Result<()> {
        self.bounded("activate_event", self.inner.activate_event(event_id))
            .await
    }
}
