use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::{FridayIdError, Preferences};

/// Capacity assigned to a Friday when none is configured.
pub const DEFAULT_MAX_GUESTS: usize = 10;

/// Normalizes an email address for storage and comparison.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A person who can be invited to a Friday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    pub id: i64,
    /// Always lowercase.
    pub email: String,
    pub name: String,
    pub preferences: Preferences,
}

/// External identifier of a Friday: the Unix timestamp of its start.
///
/// The same value is used as the remote calendar event id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FridayId(i64);

impl FridayId {
    pub fn from_timestamp(timestamp: i64) -> Self {
        Self(timestamp)
    }

    pub fn from_date(date: &DateTime<Utc>) -> Self {
        Self(date.timestamp())
    }

    pub fn timestamp(&self) -> i64 {
        self.0
    }

    /// The instant this id refers to.
    pub fn date(&self) -> Result<DateTime<Utc>, FridayIdError> {
        Utc.timestamp_opt(self.0, 0)
            .single()
            .ok_or(FridayIdError::OutOfRange(self.0))
    }

    /// The remote calendar event id for this Friday.
    pub fn event_id(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for FridayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FridayId {
    type Err = FridayIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let timestamp: i64 = s
            .trim()
            .parse()
            .map_err(|_| FridayIdError::Malformed(s.to_string()))?;
        let id = Self(timestamp);
        id.date()?;
        Ok(id)
    }
}

/// One instance of the recurring event, keyed by its exact start time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friday {
    pub date: DateTime<Utc>,
    /// Restricts visibility to members of this group. `None` is open to all.
    pub group: Option<String>,
    pub details: Option<String>,
    /// Invitation order, no duplicates.
    pub guests: Vec<String>,
    pub max_guests: usize,
    /// Whether the slot is open for RSVP.
    pub enabled: bool,
}

impl Friday {
    /// Creates an open, enabled Friday with no guests.
    pub fn new(date: DateTime<Utc>) -> Self {
        Self {
            date,
            group: None,
            details: None,
            guests: Vec::new(),
            max_guests: DEFAULT_MAX_GUESTS,
            enabled: true,
        }
    }

    /// Restricts this Friday to a group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Sets the free-text details.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Sets the capacity.
    pub fn with_max_guests(mut self, max_guests: usize) -> Self {
        self.max_guests = max_guests;
        self
    }

    /// Sets the guest list (useful for testing).
    pub fn with_guests<I, S>(mut self, guests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.guests = guests.into_iter().map(Into::into).collect();
        self
    }

    pub fn id(&self) -> FridayId {
        FridayId::from_date(&self.date)
    }

    pub fn is_full(&self) -> bool {
        self.guests.len() >= self.max_guests
    }

    pub fn has_guest(&self, email: &str) -> bool {
        self.guests.iter().any(|guest| guest == email)
    }

    /// Seats left before the capacity is reached.
    pub fn remaining_seats(&self) -> usize {
        self.max_guests.saturating_sub(self.guests.len())
    }
}

/// Host-editable fields of a Friday. Never touches the guest list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FridayUpdate {
    pub group: Option<Option<String>>,
    pub details: Option<Option<String>>,
    pub max_guests: Option<usize>,
    pub enabled: Option<bool>,
}

impl FridayUpdate {
    /// Applies the set fields onto a Friday.
    pub fn apply(&self, friday: &mut Friday) {
        if let Some(group) = &self.group {
            friday.group = group.clone().filter(|g| !g.trim().is_empty());
        }
        if let Some(details) = &self.details {
            friday.details = details.clone().filter(|d| !d.trim().is_empty());
        }
        if let Some(max_guests) = self.max_guests {
            friday.max_guests = max_guests;
        }
        if let Some(enabled) = self.enabled {
            friday.enabled = enabled;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(timestamp: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(timestamp, 0).unwrap()
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ted@TedLasso.com "), "ted@tedlasso.com");
    }

    #[test]
    fn test_friday_id_round_trips_through_string() {
        let friday = Friday::new(at(1_718_404_200));
        let id = friday.id();

        assert_eq!(id.to_string(), "1718404200");
        assert_eq!(id.event_id(), "1718404200");
        assert_eq!("1718404200".parse::<FridayId>().unwrap(), id);
        assert_eq!(id.date().unwrap(), friday.date);
    }

    #[test]
    fn test_friday_id_rejects_garbage() {
        assert!(matches!(
            "next-friday".parse::<FridayId>(),
            Err(FridayIdError::Malformed(_))
        ));
        assert!(matches!(
            i64::MAX.to_string().parse::<FridayId>(),
            Err(FridayIdError::OutOfRange(_))
        ));
    }

    #[test]
    fn test_capacity_helpers() {
        let friday = Friday::new(at(0))
            .with_max_guests(2)
            .with_guests(["alice@example.com"]);

        assert!(!friday.is_full());
        assert_eq!(friday.remaining_seats(), 1);
        assert!(friday.has_guest("alice@example.com"));

        let friday = friday.with_guests(["alice@example.com", "bob@example.com"]);
        assert!(friday.is_full());
        assert_eq!(friday.remaining_seats(), 0);
    }

    #[test]
    fn test_update_apply_leaves_guests_alone() {
        let mut friday = Friday::new(at(0)).with_guests(["alice@example.com"]);
        let update = FridayUpdate {
            group: Some(Some("ravens".to_string())),
            details: Some(Some("  ".to_string())),
            max_guests: Some(4),
            enabled: Some(false),
        };

        update.apply(&mut friday);

        assert_eq!(friday.group.as_deref(), Some("ravens"));
        assert_eq!(friday.details, None);
        assert_eq!(friday.max_guests, 4);
        assert!(!friday.enabled);
        assert_eq!(friday.guests, vec!["alice@example.com"]);
    }

    #[test]
    fn test_update_can_clear_group() {
        let mut friday = Friday::new(at(0)).with_group("ravens");
        let update = FridayUpdate {
            group: Some(None),
            ..Default::default()
        };

        update.apply(&mut friday);

        assert_eq!(friday.group, None);
    }
}
