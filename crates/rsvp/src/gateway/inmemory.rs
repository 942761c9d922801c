//! In-memory calendar gateway.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use rsvp_core::gateway::{
    CalendarEvent, CalendarGateway, EventStatus, GatewayError, ResponseStatus, Result,
};

/// Calendar gateway that keeps events in memory.
///
/// Clones share the same events.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCalendarGateway {
    events: Arc<RwLock<HashMap<String, CalendarEvent>>>,
}

impl InMemoryCalendarGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an attendee's response as if they answered from their calendar.
    pub async fn set_response_status(
        &self,
        event_id: &str,
        email: &str,
        status: ResponseStatus,
    ) -> Result<()> {
        let mut events = self.events.write().await;
        let event = events
            .get_mut(event_id)
            .ok_or_else(|| GatewayError::EventNotFound(event_id.to_string()))?;
        let attendee = event
            .attendees
            .iter_mut()
            .find(|a| a.email.eq_ignore_ascii_case(email))
            .ok_or_else(|| GatewayError::NotInvited {
                event_id: event_id.to_string(),
                email: email.to_string(),
            })?;
        attendee.response_status = status;
        Ok(())
    }

    pub async fn event_count(&self) -> usize {
        self.events.read().await.len()
    }

    async fn update<F, T>(&self, event_id: &str, f: F) -> Result<T>
    where
        F: FnOnce(&mut CalendarEvent) -> Result<T> + Send,
    {
        let mut events = self.events.write().await;
        let event = events
            .get_mut(event_id)
            .ok_or_else(|| GatewayError::EventNotFound(event_id.to_string()))?;
        f(event)
    }

    fn sorted(mut events: Vec<CalendarEvent>, limit: usize) -> Vec<CalendarEvent> {
        events.sort_by_key(|e| e.start_time);
        events.truncate(limit);
        events
    }
}

#[async_trait]
impl CalendarGateway for InMemoryCalendarGateway {
    async fn get_event(&self, event_id: &str) -> Result<CalendarEvent> {
        self.events
            .read()
            .await
            .get(event_id)
            .cloned()
            .ok_or_else(|| GatewayError::EventNotFound(event_id.to_string()))
    }

    async fn create_event(&self, event: &CalendarEvent) -> Result<()> {
        let mut events = self.events.write().await;
        if events.contains_key(&event.id) {
            return Err(GatewayError::EventAlreadyExists(event.id.clone()));
        }
        events.insert(event.id.clone(), event.clone());
        Ok(())
    }

    async fn invite_to_event(&self, event_id: &str, email: &str, name: &str) -> Result<()> {
        self.update(event_id, |event| {
            if !event.invite(email, name) {
                tracing::info!(email = %email, event_id = %event_id, "Already invited");
            }
            Ok(())
        })
        .await
    }

    async fn decline_event(&self, event_id: &str, email: &str) -> Result<()> {
        self.update(event_id, |event| {
            if event.decline(email) {
                Ok(())
            } else {
                Err(GatewayError::NotInvited {
                    event_id: event_id.to_string(),
                    email: email.to_string(),
                })
            }
        })
        .await
    }

    async fn list_events(&self, limit: usize) -> Result<Vec<CalendarEvent>> {
        let now = Utc::now();
        let events = self
            .events
            .read()
            .await
            .values()
            .filter(|e| e.status != EventStatus::Cancelled && e.end_time >= now)
            .cloned()
            .collect();
        Ok(Self::sorted(events, limit))
    }

    async fn list_events_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<CalendarEvent>> {
        let events = self
            .events
            .read()
            .await
            .values()
            .filter(|e| e.status != EventStatus::Cancelled)
            .filter(|e| e.start_time <= end && e.end_time >= start)
            .cloned()
            .collect();
        Ok(Self::sorted(events, limit))
    }

    async fn cancel_event(&self, event_id: &str) -> Result<()> {
        self.update(event_id, |event| {
            event.status = EventStatus::Cancelled;
            Ok(())
        })
        .await
    }

    async fn activate_event(&self, event_id: &str) -> Result<()> {
        self.update(event_id, |event| {
            event.status = EventStatus::Confirmed;
            Ok(())
        })
        .await
    }
}
