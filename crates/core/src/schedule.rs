//! The weekly slot schedule: every Friday at 17:30 local time.

use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

use crate::storage::{DateRange, DateRangeError};

/// Local start time of every slot.
pub const SLOT_HOUR: u32 = 17;
pub const SLOT_MINUTE: u32 = 30;

/// Default timezone slots are anchored to.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::New_York;

/// Every Friday 17:30 in `tz` that falls inside `[after, after + days]`, ascending.
pub fn upcoming_slots(
    after: DateTime<Utc>,
    days: u32,
    tz: Tz,
) -> Result<Vec<DateTime<Utc>>, DateRangeError> {
    let window = DateRange::ahead(after, days)?;
    let slot_time =
        NaiveTime::from_hms_opt(SLOT_HOUR, SLOT_MINUTE, 0).ok_or(DateRangeError::OutOfBounds)?;

    let mut date = after.with_timezone(&tz).date_naive();
    while date.weekday() != Weekday::Fri {
        date = date.succ_opt().ok_or(DateRangeError::OutOfBounds)?;
    }

    let mut slots = Vec::new();
    loop {
        // A local time skipped by a DST jump has no instant; Friday 17:30 never is in practice.
        if let Some(slot) = tz.from_local_datetime(&date.and_time(slot_time)).earliest() {
            let slot = slot.with_timezone(&Utc);
            if slot > window.end {
                break;
            }
            if window.contains(&slot) {
                slots.push(slot);
            }
        }
        date = date
            .checked_add_signed(Duration::days(7))
            .ok_or(DateRangeError::OutOfBounds)?;
    }
    Ok(slots)
}

/// Whether `instant` is a slot start in `tz`.
pub fn is_slot(instant: &DateTime<Utc>, tz: Tz) -> bool {
    let local = instant.with_timezone(&tz);
    local.weekday() == Weekday::Fri
        && local.time() == NaiveTime::from_hms_opt(SLOT_HOUR, SLOT_MINUTE, 0).unwrap_or_default()
}
