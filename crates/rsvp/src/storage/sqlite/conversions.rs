//! SQLite row conversion functions.
//!
//! Pure functions for converting between SQLite rows and domain types.

use chrono::{DateTime, TimeZone, Utc};
use rsvp_core::friday::{Friday, Friend, Preferences};
use rsvp_core::storage::RepositoryError;
use rusqlite::types::Type;
use rusqlite::Row;

// ============================================================================
// Friend conversions
// ============================================================================

/// Convert a SQLite row to a Friend.
///
/// Expected columns: id, email, name, preferences
pub fn row_to_friend(row: &Row) -> rusqlite::Result<Friend> {
    let id: i64 = row.get(0)?;
    let email: String = row.get(1)?;
    let name: String = row.get(2)?;
    let preferences: String = row.get(3)?;

    Ok(Friend {
        id,
        email,
        name,
        preferences: parse_preferences(3, &preferences)?,
    })
}

/// Decodes the preferences column. An empty string is the empty preference set.
pub fn parse_preferences(column: usize, json: &str) -> rusqlite::Result<Preferences> {
    if json.trim().is_empty() {
        return Ok(Preferences::default());
    }
    serde_json::from_str(json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

pub fn preferences_to_json(preferences: &Preferences) -> Result<String, RepositoryError> {
    serde_json::to_string(preferences).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

// ============================================================================
// Friday conversions
// ============================================================================

/// Convert a SQLite row to a Friday.
///
/// Expected columns: start_time, invited_group, details, invited, max_guests, enabled
pub fn row_to_friday(row: &Row) -> rusqlite::Result<Friday> {
    let start_time: i64 = row.get(0)?;
    let group: Option<String> = row.get(1)?;
    let details: Option<String> = row.get(2)?;
    let invited: String = row.get(3)?;
    let max_guests: i64 = row.get(4)?;
    let enabled: bool = row.get(5)?;

    Ok(Friday {
        date: parse_timestamp(0, start_time)?,
        group: group.filter(|g| !g.is_empty()),
        details: details.filter(|d| !d.is_empty()),
        guests: parse_guests(3, &invited)?,
        max_guests: usize::try_from(max_guests)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Integer, Box::new(e)))?,
        enabled,
    })
}

/// Decodes the guest list. A truncated or non-array value is an error, never an empty list.
pub fn parse_guests(column: usize, json: &str) -> rusqlite::Result<Vec<String>> {
    serde_json::from_str(json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

fn parse_timestamp(column: usize, timestamp: i64) -> rusqlite::Result<DateTime<Utc>> {
    Utc.timestamp_opt(timestamp, 0).single().ok_or_else(|| {
        rusqlite::Error::IntegralValueOutOfRange(column, timestamp)
    })
}

/// Capacity as stored in SQLite.
pub fn max_guests_to_sql(max_guests: usize) -> Result<i64, RepositoryError> {
    i64::try_from(max_guests)
        .map_err(|_| RepositoryError::InvalidData(format!("capacity too large: {max_guests}")))
}

#[cfg(test)]
mod tests {
    use rsvp_core::friday::{Doneness, Topping};

    use super::*;

    #[test]
    fn test_parse_guests_keeps_order() {
        let guests = parse_guests(3, r#"["bob@example.com","alice@example.com"]"#).unwrap();

        assert_eq!(guests, vec!["bob@example.com", "alice@example.com"]);
    }

    #[test]
    fn test_parse_guests_rejects_truncated_json() {
        let result = parse_guests(3, r#"["bob@example.com","ali"#);

        assert!(matches!(
            result,
            Err(rusqlite::Error::FromSqlConversionFailure(3, Type::Text, _))
        ));
    }

    #[test]
    fn test_parse_guests_rejects_non_array() {
        assert!(parse_guests(3, r#"{"guest":"bob@example.com"}"#).is_err());
    }

    #[test]
    fn test_parse_preferences_empty_is_default() {
        assert_eq!(parse_preferences(3, "").unwrap(), Preferences::default());
        assert_eq!(parse_preferences(3, "{}").unwrap(), Preferences::default());
    }

    #[test]
    fn test_preferences_json_round_trip() {
        let preferences = Preferences {
            toppings: vec![Topping::Pepperoni, Topping::BananaPeppers],
            doneness: Some(Doneness::WellDone),
            ..Default::default()
        };

        let json = preferences_to_json(&preferences).unwrap();

        assert_eq!(parse_preferences(3, &json).unwrap(), preferences);
    }

    #[test]
    fn test_parse_timestamp_out_of_range() {
        assert!(parse_timestamp(0, i64::MAX).is_err());
    }

    #[test]
    fn test_max_guests_to_sql() {
        assert_eq!(max_guests_to_sql(10).unwrap(), 10);
    }
}
