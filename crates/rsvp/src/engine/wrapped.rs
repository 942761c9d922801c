//! Year in review: who came to which Fridays, read back from the calendar.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::Serialize;
use tracing::info;

use rsvp_core::cache::{wrapped_key, year_from_wrapped_key, RefreshFn, TtlCache};
use rsvp_core::friday::normalize_email;
use rsvp_core::gateway::CalendarGateway;

use super::{Engine, EngineConfig, EngineError, Result};

/// Upper bound on events read for one year.
const WRAPPED_EVENT_LIMIT: usize = 100;

/// Attendance over one calendar year.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WrappedData {
    /// Start times of the Fridays each friend did not decline, ascending.
    pub friends: BTreeMap<String, Vec<DateTime<Utc>>>,
    pub total_fridays: usize,
}

impl WrappedData {
    /// The Fridays a friend attended; empty if none.
    pub fn attendance(&self, email: &str) -> &[DateTime<Utc>] {
        self.friends
            .get(&normalize_email(email))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

pub(super) type WrappedCache = TtlCache<WrappedData, EngineError>;

/// `[Jan 1, Jan 1 of the next year)` in UTC.
fn year_window(year: i32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single()?;
    let end = Utc
        .with_ymd_and_hms(year.checked_add(1)?, 1, 1, 0, 0, 0)
        .single()?;
    Some((start, end))
}

async fn collect(calendar: &dyn CalendarGateway, year: i32) -> Result<WrappedData> {
    let (start, end) = year_window(year).ok_or(EngineError::InvalidYear(year))?;
    let events = calendar
        .list_events_between(start, end, WRAPPED_EVENT_LIMIT)
        .await?;

    let mut data = WrappedData::default();
    for event in events.iter().filter(|e| e.start_time.year() == year) {
        for attendee in event.attendees.iter().filter(|a| !a.has_declined()) {
            data.friends
                .entry(normalize_email(&attendee.email))
                .or_default()
                .push(event.start_time);
        }
        data.total_fridays += 1;
    }
    for dates in data.friends.values_mut() {
        dates.sort_unstable();
    }

    info!(year, friends = data.friends.len(), total_fridays = data.total_fridays, "Built year in review");
    Ok(data)
}

pub(super) fn wrapped_cache(calendar: Arc<dyn CalendarGateway>, config: &EngineConfig) -> WrappedCache {
    TtlCache::new(
        config.wrapped_ttl,
        RefreshFn(move |key: String| {
            let calendar = calendar.clone();
            async move {
                let year = year_from_wrapped_key(&key).ok_or_else(|| {
                    EngineError::NotFound {
                        entity_type: "Wrapped",
                        id: key.clone(),
                    }
                })?;
                collect(calendar.as_ref(), year).await
            }
        }),
    )
}

impl Engine {
    /// Attendance for a past or current year, cached for `wrapped_ttl`.
    ///
    /// Empty when calendar integration is disabled.
    pub async fn wrapped(&self, year: i32) -> Result<WrappedData> {
        if year > Utc::now().year() {
            return Err(EngineError::InvalidYear(year));
        }
        if self.calendar().is_none() {
            return Ok(WrappedData::default());
        }
        self.wrapped.get(&wrapped_key(year)).await
    }
}
