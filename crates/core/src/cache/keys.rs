use crate::friday::normalize_email;

const UPCOMING_FRIDAYS_PREFIX: &str = "fridays:upcoming:";
const WRAPPED_PREFIX: &str = "wrapped:";

/// Returns the cache key for the upcoming Fridays within `days_ahead` days.
pub fn upcoming_fridays_key(days_ahead: u32) -> String {
    format!("{UPCOMING_FRIDAYS_PREFIX}{days_ahead}")
}

/// Extracts the day count from an upcoming Fridays key.
///
/// Returns `None` for any other key.
pub fn days_from_upcoming_fridays_key(key: &str) -> Option<u32> {
    key.strip_prefix(UPCOMING_FRIDAYS_PREFIX)?.parse().ok()
}

/// Returns the cache key for a friend, by email.
pub fn friend_key(email: &str) -> String {
    normalize_email(email)
}

/// Returns the cache key for a year in review.
pub fn wrapped_key(year: i32) -> String {
    format!("{WRAPPED_PREFIX}{year}")
}

pub fn year_from_wrapped_key(key: &str) -> Option<i32> {
    key.strip_prefix(WRAPPED_PREFIX)?.parse().ok()
}
