use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::friday::{Friday, Friend, Preferences};

use super::Result;

/// Durable Friend and Friday persistence.
///
/// Every backend implements the same contract. Callers pass emails already
/// run through [`crate::friday::normalize_email`].
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    // ===== Friends =====

    /// Gets a friend by email. Fails with `NotFound` if absent.
    async fn get_friend_by_email(&self, email: &str) -> Result<Friend>;

    /// Gets a friend by numeric id. Fails with `NotFound` if absent.
    async fn get_friend_by_id(&self, id: i64) -> Result<Friend>;

    /// Inserts a friend, or updates the name if the email already exists.
    async fn add_friend(&self, email: &str, name: &str) -> Result<()>;

    /// Removes a friend. No-op if absent.
    async fn remove_friend(&self, email: &str) -> Result<()>;

    /// All friends, ordered by email.
    async fn list_friends(&self) -> Result<Vec<Friend>>;

    async fn get_preferences(&self, email: &str) -> Result<Preferences>;

    async fn set_preferences(&self, email: &str, preferences: &Preferences) -> Result<()>;

    // ===== Fridays =====

    /// Fridays in `[now, now + days_ahead]`, ascending.
    async fn get_upcoming_fridays(&self, days_ahead: u32) -> Result<Vec<Friday>> {
        self.get_upcoming_fridays_after(Utc::now(), days_ahead).await
    }

    /// Fridays in `[after, after + days_ahead]`, ascending.
    async fn get_upcoming_fridays_after(
        &self,
        after: DateTime<Utc>,
        days_ahead: u32,
    ) -> Result<Vec<Friday>>;

    async fn does_friday_exist(&self, date: DateTime<Utc>) -> Result<bool>;

    /// Persists a Friday with no guests. No-op if one already exists at `friday.date`.
    async fn add_friday(&self, friday: &Friday) -> Result<()>;

    /// Gets the Friday at exactly `date`. Fails with `NotFound` if absent.
    async fn get_friday(&self, date: DateTime<Utc>) -> Result<Friday>;

    /// Overwrites group, details, capacity and enabled. Never touches guests.
    async fn update_friday(&self, friday: &Friday) -> Result<()>;

    /// Removes a Friday and its guest list. No-op if absent.
    async fn remove_friday(&self, date: DateTime<Utc>) -> Result<()>;

    /// All Fridays, ascending.
    async fn list_fridays(&self) -> Result<Vec<Friday>>;

    /// Atomically appends `email` to the guest list of the Friday at `friday.date`.
    ///
    /// Already present is success. A full guest list fails with
    /// `CapacityReached` and leaves the list unchanged. The capacity check
    /// uses the persisted `max_guests`, not the one on `friday`.
    async fn add_friend_to_friday(&self, email: &str, friday: &Friday) -> Result<()>;

    /// Atomically removes `email` from the guest list. No-op if absent.
    async fn remove_friend_from_friday(&self, email: &str, date: DateTime<Utc>) -> Result<()>;
}
