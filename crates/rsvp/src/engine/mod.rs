//! The attendance engine.
//!
//! Owns the Friday/guest workflows on top of an [`AttendanceStore`] and a
//! [`CalendarGateway`]. The local store is the system of record for who is
//! coming; the remote calendar is a best-effort mirror. A remote failure after
//! a successful local write is reported to the caller but never rolled back.

mod admin;
mod decline;
mod error;
mod invite;
mod reconcile;
mod upcoming;
mod wrapped;

#[cfg(test)]
mod fixtures;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use rsvp_core::friday::{Friday, FridayId, FridayIdError, DEFAULT_MAX_GUESTS};
use rsvp_core::gateway::{CalendarEvent, CalendarGateway};
use rsvp_core::schedule::DEFAULT_TIMEZONE;
use rsvp_core::storage::AttendanceStore;

pub use error::{EngineError, Result};
pub use reconcile::{run_reconciler, ReconcileReport};
pub use wrapped::WrappedData;

/// Engine settings, projected from the process configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// When false the engine never touches the remote calendar.
    pub calendar_enabled: bool,
    pub reconciliation_period: Duration,
    /// Delay before retrying a pass that could not list Fridays.
    pub retry_delay: Duration,
    pub lookahead_days: u32,
    pub default_max_guests: usize,
    pub event_duration: chrono::Duration,
    pub event_summary: String,
    pub event_description: String,
    pub timezone: Tz,
    /// How long a computed year in review is served from cache.
    pub wrapped_ttl: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            calendar_enabled: false,
            reconciliation_period: Duration::from_secs(60 * 60),
            retry_delay: Duration::from_secs(60),
            lookahead_days: 30,
            default_max_guests: DEFAULT_MAX_GUESTS,
            event_duration: chrono::Duration::hours(4),
            event_summary: "Pizza Friday".to_string(),
            event_description: "Welcome to Pizza Friday!".to_string(),
            timezone: DEFAULT_TIMEZONE,
            wrapped_ttl: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// Invitation, decline and host workflows, the year in review and the
/// reconciliation pass.
///
/// Cheap to clone; clones share the store and the gateway.
#[derive(Clone)]
pub struct Engine {
    store: Arc<dyn AttendanceStore>,
    calendar: Arc<dyn CalendarGateway>,
    config: Arc<EngineConfig>,
    wrapped: Arc<wrapped::WrappedCache>,
}

impl Engine {
    pub fn new(
        store: Arc<dyn AttendanceStore>,
        calendar: Arc<dyn CalendarGateway>,
        config: EngineConfig,
    ) -> Self {
        let wrapped = Arc::new(wrapped::wrapped_cache(calendar.clone(), &config));
        Self {
            store,
            calendar,
            config: Arc::new(config),
            wrapped,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn AttendanceStore> {
        &self.store
    }

    /// The remote calendar, or `None` when calendar integration is disabled.
    fn calendar(&self) -> Option<&dyn CalendarGateway> {
        self.config
            .calendar_enabled
            .then_some(self.calendar.as_ref())
    }

    /// Parses an external Friday id into the instant it names.
    fn parse_friday_id(friday_id: &str) -> Result<(FridayId, DateTime<Utc>)> {
        let id: FridayId = friday_id.parse()?;
        Ok((id, id.date()?))
    }

    /// A Friday with the configured default capacity.
    fn new_friday(&self, date: DateTime<Utc>) -> Friday {
        Friday::new(date).with_max_guests(self.config.default_max_guests)
    }

    /// The remote event mirroring a Friday.
    fn event_for(&self, friday: &Friday) -> Result<CalendarEvent> {
        let id = friday.id();
        let end = friday
            .date
            .checked_add_signed(self.config.event_duration)
            .ok_or(FridayIdError::OutOfRange(id.timestamp()))?;
        let mut description = self.config.event_description.clone();
        if let Some(details) = &friday.details {
            description = format!("{description}\n\n{details}");
        }
        Ok(CalendarEvent::new(id.event_id(), friday.date, end)
            .with_summary(self.config.event_summary.clone())
            .with_description(description))
    }
}
