//! In-memory repository implementation.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use rsvp_core::friday::{Friday, Friend, Preferences};
use rsvp_core::storage::{AttendanceStore, DateRange, RepositoryError, Result};

#[derive(Debug, Default)]
struct Friends {
    next_id: i64,
    by_email: HashMap<String, Friend>,
}

/// In-memory attendance store.
///
/// Data is not persisted and will be lost when the repository is dropped.
/// Clones share the same underlying data.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    friends: Arc<RwLock<Friends>>,
    /// Keyed by start timestamp, so iteration is ascending by date.
    fridays: Arc<RwLock<BTreeMap<i64, Friday>>>,
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AttendanceStore for InMemoryRepository {
    async fn get_friend_by_email(&self, email: &str) -> Result<Friend> {
        let friends = self.friends.read().await;
        friends
            .by_email
            .get(email)
            .cloned()
            .ok_or_else(|| RepositoryError::friend_not_found(email))
    }

    async fn get_friend_by_id(&self, id: i64) -> Result<Friend> {
        let friends = self.friends.read().await;
        friends
            .by_email
            .values()
            .find(|f| f.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::friend_not_found(id.to_string()))
    }

    async fn add_friend(&self, email: &str, name: &str) -> Result<()> {
        let mut friends = self.friends.write().await;
        if let Some(friend) = friends.by_email.get_mut(email) {
            friend.name = name.to_string();
            return Ok(());
        }
        friends.next_id += 1;
        let friend = Friend {
            id: friends.next_id,
            email: email.to_string(),
            name: name.to_string(),
            preferences: Preferences::default(),
        };
        friends.by_email.insert(email.to_string(), friend);
        Ok(())
    }

    async fn remove_friend(&self, email: &str) -> Result<()> {
        self.friends.write().await.by_email.remove(email);
        Ok(())
    }

    async fn list_friends(&self) -> Result<Vec<Friend>> {
        let friends = self.friends.read().await;
        let mut list: Vec<Friend> = friends.by_email.values().cloned().collect();
        list.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(list)
    }

    async fn get_preferences(&self, email: &str) -> Result<Preferences> {
        Ok(self.get_friend_by_email(email).await?.preferences)
    }

    async fn set_preferences(&self, email: &str, preferences: &Preferences) -> Result<()> {
        let mut friends = self.friends.write().await;
        let friend = friends
            .by_email
            .get_mut(email)
            .ok_or_else(|| RepositoryError::friend_not_found(email))?;
        friend.preferences = preferences.clone();
        Ok(())
    }

    async fn get_upcoming_fridays_after(
        &self,
        after: DateTime<Utc>,
        days_ahead: u32,
    ) -> Result<Vec<Friday>> {
        let window = DateRange::ahead(after, days_ahead)
            .map_err(|e| RepositoryError::InvalidData(e.to_string()))?;
        let fridays = self.fridays.read().await;
        Ok(fridays
            .range(window.start.timestamp()..=window.end.timestamp())
            .map(|(_, friday)| friday.clone())
            .collect())
    }

    async fn does_friday_exist(&self, date: DateTime<Utc>) -> Result<bool> {
        Ok(self.fridays.read().await.contains_key(&date.timestamp()))
    }

    async fn add_friday(&self, friday: &Friday) -> Result<()> {
        let mut fridays = self.fridays.write().await;
        fridays.entry(friday.date.timestamp()).or_insert_with(|| Friday {
            guests: Vec::new(),
            ..friday.clone()
        });
        Ok(())
    }

    async fn get_friday(&self, date: DateTime<Utc>) -> Result<Friday> {
        let fridays = self.fridays.read().await;
        fridays
            .get(&date.timestamp())
            .cloned()
            .ok_or_else(|| RepositoryError::friday_not_found(date.timestamp().to_string()))
    }

    async fn update_friday(&self, friday: &Friday) -> Result<()> {
        let mut fridays = self.fridays.write().await;
        let key = friday.date.timestamp();
        let stored = fridays
            .get_mut(&key)
            .ok_or_else(|| RepositoryError::friday_not_found(key.to_string()))?;
        stored.group = friday.group.clone();
        stored.details = friday.details.clone();
        stored.max_guests = friday.max_guests;
        stored.enabled = friday.enabled;
        Ok(())
    }

    async fn remove_friday(&self, date: DateTime<Utc>) -> Result<()> {
        self.fridays.write().await.remove(&date.timestamp());
        Ok(())
    }

    async fn list_fridays(&self) -> Result<Vec<Friday>> {
        Ok(self.fridays.read().await.values().cloned().collect())
    }

    async fn add_friend_to_friday(&self, email: &str, friday: &Friday) -> Result<()> {
        let mut fridays = self.fridays.write().await;
        let key = friday.date.timestamp();
        let stored = fridays
            .get_mut(&key)
            .ok_or_else(|| RepositoryError::friday_not_found(key.to_string()))?;
        if stored.has_guest(email) {
            return Ok(());
        }
        if stored.is_full() {
            return Err(RepositoryError::CapacityReached {
                id: key.to_string(),
                max_guests: stored.max_guests,
            });
        }
        stored.guests.push(email.to_string());
        Ok(())
    }

    async fn remove_friend_from_friday(&self, email: &str, date: DateTime<Utc>) -> Result<()> {
        let mut fridays = self.fridays.write().await;
        if let Some(stored) = fridays.get_mut(&date.timestamp()) {
            if let Some(index) = stored.guests.iter().position(|g| g == email) {
                stored.guests.remove(index);
            }
        }
        Ok(())
    }
}
