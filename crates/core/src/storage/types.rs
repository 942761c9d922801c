use chrono::{DateTime, Duration, Utc};

use super::DateRangeError;

/// An inclusive window of instants, used to select upcoming Fridays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Creates a new range, validating that start <= end.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, DateRangeError> {
        if start > end {
            return Err(DateRangeError::InvalidRange);
        }
        Ok(Self { start, end })
    }

    /// The range `[after, after + days]`.
    pub fn ahead(after: DateTime<Utc>, days: u32) -> Result<Self, DateRangeError> {
        let end = after
            .checked_add_signed(Duration::days(i64::from(days)))
            .ok_or(DateRangeError::OutOfBounds)?;
        Ok(Self { start: after, end })
    }

    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        self.start <= *instant && *instant <= self.end
    }
}
