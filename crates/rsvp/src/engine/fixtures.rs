//! Shared test wiring: an engine over the in-memory store and calendar.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use rsvp_core::friday::{Friday, Identity};
use rsvp_core::gateway::{self, CalendarEvent, CalendarGateway, GatewayError};
use rsvp_core::schedule::{upcoming_slots, DEFAULT_TIMEZONE};
use rsvp_core::storage::AttendanceStore;

use super::{Engine, EngineConfig};
use crate::gateway::InMemoryCalendarGateway;
use crate::storage::InMemoryRepository;

pub struct Fixture {
    pub engine: Engine,
    pub store: InMemoryRepository,
    pub calendar: InMemoryCalendarGateway,
}

impl Fixture {
    /// Calendar integration enabled.
    pub fn new() -> Self {
        Self::with_config(EngineConfig {
            calendar_enabled: true,
            ..Default::default()
        })
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let store = InMemoryRepository::new();
        let calendar = InMemoryCalendarGateway::new();
        let engine = Engine::new(
            Arc::new(store.clone()),
            Arc::new(calendar.clone()),
            config,
        );
        Self {
            engine,
            store,
            calendar,
        }
    }

    /// Persists a Friday and returns it.
    pub async fn friday(&self, friday: Friday) -> Friday {
        self.store.add_friday(&friday).await.unwrap();
        self.store.get_friday(friday.date).await.unwrap()
    }

    pub async fn guests(&self, date: DateTime<Utc>) -> Vec<String> {
        self.store.get_friday(date).await.unwrap().guests
    }
}

/// A Friday slot a week from now, on a whole second.
pub fn next_week() -> DateTime<Utc> {
    let now = Utc::now() + Duration::days(7);
    Utc.timestamp_opt(now.timestamp(), 0).unwrap()
}

/// The first weekly slot at least a day from now.
pub fn next_slot() -> DateTime<Utc> {
    upcoming_slots(Utc::now() + Duration::days(1), 14, DEFAULT_TIMEZONE).unwrap()[0]
}

pub fn guest(name: &str) -> Identity {
    Identity::new(&format!("{name}@example.com"), name)
}

pub fn host(name: &str) -> Identity {
    guest(name).as_host()
}

/// Gateway whose every call fails with a server error.
pub struct FailingCalendar;

impl FailingCalendar {
    fn error() -> GatewayError {
        GatewayError::Api {
            status: 500,
            message: "Backend Error".to_string(),
        }
    }
}

#[async_trait]
impl CalendarGateway for FailingCalendar {
    async fn get_event(&self, _event_id: &str) -> gateway::Result<CalendarEvent> {
        Err(Self::error())
    }

    async fn create_event(&self, _event: &CalendarEvent) -> gateway::Result<()> {
        Err(Self::error())
    }

    async fn invite_to_event(&self, _event_id: &str, _email: &str, _name: &str) -> gateway::Result<()> {
        Err(Self::error())
    }

    async fn decline_event(&self, _event_id: &str, _email: &str) -> gateway::Result<()> {
        Err(Self::error())
    }

    async fn list_events(&self, _limit: usize) -> gateway::Result<Vec<CalendarEvent>> {
        Err(Self::error())
    }

    async fn list_events_between(
        &self,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
        _limit: usize,
    ) -> gateway::Result<Vec<CalendarEvent>> {
        Err(Self::error())
    }

    async fn cancel_event(&self, _event_id: &str) -> gateway::Result<()> {
        Err(Self::error())
    }

    async fn activate_event(&self, _event_id: &str) -> gateway::Result<()> {
        Err(Self::error())
    }
}

/// An engine over a fresh in-memory store and a calendar that always fails.
pub fn failing_engine() -> (Engine, InMemoryRepository) {
    let store = InMemoryRepository::new();
    let engine = Engine::new(
        Arc::new(store.clone()),
        Arc::new(FailingCalendar),
        EngineConfig {
            calendar_enabled: true,
            ..Default::default()
        },
    );
    (engine, store)
}

/// Delays invites and creations so concurrent callers interleave.
pub struct SlowCalendar {
    inner: InMemoryCalendarGateway,
}

impl SlowCalendar {
    pub fn new(inner: InMemoryCalendarGateway) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl CalendarGateway for SlowCalendar {
    async fn get_event(&self, event_id: &str) -> gateway::Result<CalendarEvent> {
        self.inner.get_event(event_id).await
    }

    async fn create_event(&self, event: &CalendarEvent) -> gateway::Result<()> {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        self.inner.create_event(event).await
    }

    async fn invite_to_event(&self, event_id: &str, email: &str, name: &str) -> gateway::Result<()> {
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        self.inner.invite_to_event(event_id, email, name).await
    }

    async fn decline_event(&self, event_id: &str, email: &str) -> gateway::Result<()> {
        self.inner.decline_event(event_id, email).await
    }

    async fn list_events(&self, limit: usize) -> gateway::Result<Vec<CalendarEvent>> {
        self.inner.list_events(limit).await
    }

    async fn list_events_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: usize,
    ) -> gateway::Result<Vec<CalendarEvent>> {
        self.inner.list_events_between(start, end, limit).await
    }

    async fn cancel_event(&self, event_id: &str) -> gateway::Result<()> {
        self.inner.cancel_event(event_id).await
    }

    async fn activate_event(&self, event_id: &str) -> gateway::Result<()> {
        self.inner.activate_event(event_id).await
    }
}
