//! Cached attendance store decorator.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use rsvp_core::cache::{
    days_from_upcoming_fridays_key, friend_key, upcoming_fridays_key, RefreshFn, TtlCache,
};
use rsvp_core::friday::{Friday, Friend, Preferences};
use rsvp_core::storage::{AttendanceStore, RepositoryError, Result};

/// Freshness windows for the three caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTtls {
    pub fridays: Duration,
    pub friends: Duration,
    pub unknown_friends: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            fridays: Duration::from_secs(60 * 60),
            friends: Duration::from_secs(24 * 60 * 60),
            unknown_friends: Duration::from_secs(5 * 60),
        }
    }
}

/// Attendance store decorator with TTL caches.
///
/// - Upcoming Fridays, keyed by day count
/// - Friends, keyed by email
/// - Unknown emails, seeded on a `NotFound` lookup and never refreshed
///
/// Friday writes clear the Friday cache. Friend writes re-seed that friend.
pub struct CachedAttendanceStore<S>
where
    S: AttendanceStore,
{
    store: Arc<S>,
    fridays: TtlCache<Vec<Friday>, RepositoryError>,
    friends: TtlCache<Friend, RepositoryError>,
    unknown_friends: TtlCache<(), RepositoryError>,
}

impl<S> CachedAttendanceStore<S>
where
    S: AttendanceStore + 'static,
{
    pub fn new(store: Arc<S>, ttls: CacheTtls) -> Self {
        let fridays_store = store.clone();
        let fridays = TtlCache::new(
            ttls.fridays,
            RefreshFn(move |key: String| {
                let store = fridays_store.clone();
                async move {
                    let days = days_from_upcoming_fridays_key(&key).ok_or_else(|| {
                        RepositoryError::InvalidData(format!("bad upcoming Fridays key: {key}"))
                    })?;
                    store.get_upcoming_fridays(days).await
                }
            }),
        );

        let friends_store = store.clone();
        let friends = TtlCache::new(
            ttls.friends,
            RefreshFn(move |email: String| {
                let store = friends_store.clone();
                async move { store.get_friend_by_email(&email).await }
            }),
        );

        Self {
            store,
            fridays,
            friends,
            unknown_friends: TtlCache::without_refresh(ttls.unknown_friends),
        }
    }

    async fn invalidate_fridays(&self) {
        self.fridays.clear().await;
        tracing::debug!("Invalidated upcoming Fridays cache");
    }

    /// Re-reads a friend from the store into the cache.
    async fn reseed_friend(&self, email: &str) -> Result<()> {
        let friend = self.store.get_friend_by_email(email).await?;
        self.friends.store(&friend_key(email), friend).await;
        Ok(())
    }
}

#[async_trait]
impl<S> AttendanceStore for CachedAttendanceStore<S>
where
    S: AttendanceStore + 'static,
{
    async fn get_friend_by_email(&self, email: &str) -> Result<Friend> {
        let key = friend_key(email);
        if !self.friends.has(&key).await && self.unknown_friends.has(&key).await {
            tracing::trace!(email = %key, "Negative cache hit for friend");
            return Err(RepositoryError::friend_not_found(key));
        }

        match self.friends.get(&key).await {
            Err(err) if err.is_not_found() => {
                self.unknown_friends.store(&key, ()).await;
                Err(err)
            }
            result => result,
        }
    }

    async fn get_friend_by_id(&self, id: i64) -> Result<Friend> {
        self.store.get_friend_by_id(id).await
    }

    async fn add_friend(&self, email: &str, name: &str) -> Result<()> {
        self.store.add_friend(email, name).await?;
        self.reseed_friend(email).await?;
        tracing::debug!(email = %email, name = %name, "Friend added");
        Ok(())
    }

    async fn remove_friend(&self, email: &str) -> Result<()> {
        self.store.remove_friend(email).await?;
        self.friends.clear().await;
        tracing::debug!(email = %email, "Friend removed");
        Ok(())
    }

    async fn list_friends(&self) -> Result<Vec<Friend>> {
        self.store.list_friends().await
    }

    async fn get_preferences(&self, email: &str) -> Result<Preferences> {
        Ok(self.get_friend_by_email(email).await?.preferences)
    }

    async fn set_preferences(&self, email: &str, preferences: &Preferences) -> Result<()> {
        self.store.set_preferences(email, preferences).await?;
        self.reseed_friend(email).await
    }

    async fn get_upcoming_fridays(&self, days_ahead: u32) -> Result<Vec<Friday>> {
        self.fridays.get(&upcoming_fridays_key(days_ahead)).await
    }

    async fn get_upcoming_fridays_after(
        &self,
        after: DateTime<Utc>,
        days_ahead: u32,
    ) -> Result<Vec<Friday>> {
        self.store.get_upcoming_fridays_after(after, days_ahead).await
    }

    async fn does_friday_exist(&self, date: DateTime<Utc>) -> Result<bool> {
        self.store.does_friday_exist(date).await
    }

    async fn add_friday(&self, friday: &Friday) -> Result<()> {
        self.store.add_friday(friday).await?;
        self.invalidate_fridays().await;
        Ok(())
    }

    async fn get_friday(&self, date: DateTime<Utc>) -> Result<Friday> {
        self.store.get_friday(date).await
    }

    async fn update_friday(&self, friday: &Friday) -> Result<()> {
        self.store.update_friday(friday).await?;
        self.invalidate_fridays().await;
        Ok(())
    }

    async fn remove_friday(&self, date: DateTime<Utc>) -> Result<()> {
        self.store.remove_friday(date).await?;
        self.invalidate_fridays().await;
        Ok(())
    }

    async fn list_fridays(&self) -> Result<Vec<Friday>> {
        self.store.list_fridays().await
    }

    async fn add_friend_to_friday(&self, email: &str, friday: &Friday) -> Result<()> {
        self.store.add_friend_to_friday(email, friday).await?;
        self.invalidate_fridays().await;
        Ok(())
    }

    async fn remove_friend_from_friday(&self, email: &str, date: DateTime<Utc>) -> Result<()> {
        self.store.remove_friend_from_friday(email, date).await?;
        self.invalidate_fridays().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use chrono::Duration as ChronoDuration;

    use super::*;
    use crate::storage::inmemory::InMemoryRepository;

    /// Counts friend lookups reaching the wrapped store.
    #[derive(Default)]
    struct CountingStore {
        inner: InMemoryRepository,
        friend_lookups: AtomicUsize,
        friday_lookups: AtomicUsize,
        slow_fridays: AtomicBool,
    }

    #[async_trait]
    impl AttendanceStore for CountingStore {
        async fn get_friend_by_email(&self, email: &str) -> Result<Friend> {
            self.friend_lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.get_friend_by_email(email).await
        }
        async fn get_friend_by_id(&self, id: i64) -> Result<Friend> {
            self.inner.get_friend_by_id(id).await
        }
        async fn add_friend(&self, email: &str, name: &str) -> Result<()> {
            self.inner.add_friend(email, name).await
        }
        async fn remove_friend(&self, email: &str) -> Result<()> {
            self.inner.remove_friend(email).await
        }
        async fn list_friends(&self) -> Result<Vec<Friend>> {
            self.inner.list_friends().await
        }
        async fn get_preferences(&self, email: &str) -> Result<Preferences> {
            self.inner.get_preferences(email).await
        }
        async fn set_preferences(&self, email: &str, preferences: &Preferences) -> Result<()> {
            self.inner.set_preferences(email, preferences).await
        }
        async fn get_upcoming_fridays_after(
            &self,
            after: DateTime<Utc>,
            days_ahead: u32,
        ) -> Result<Vec<Friday>> {
            self.friday_lookups.fetch_add(1, Ordering::SeqCst);
            let fridays = self.inner.get_upcoming_fridays_after(after, days_ahead).await;
            if self.slow_fridays.load(Ordering::SeqCst) {
                tokio::time::sleep(std::time::Duration::from_millis(150)).await;
            }
            fridays
        }
        async fn does_friday_exist(&self, date: DateTime<Utc>) -> Result<bool> {
            self.inner.does_friday_exist(date).await
        }
        async fn add_friday(&self, friday: &Friday) -> Result<()> {
            self.inner.add_friday(friday).await
        }
        async fn get_friday(&self, date: DateTime<Utc>) -> Result<Friday> {
            self.inner.get_friday(date).await
        }
        async fn update_friday(&self, friday: &Friday) -> Result<()> {
            self.inner.update_friday(friday).await
        }
        async fn remove_friday(&self, date: DateTime<Utc>) -> Result<()> {
            self.inner.remove_friday(date).await
        }
        async fn list_fridays(&self) -> Result<Vec<Friday>> {
            self.inner.list_fridays().await
        }
        async fn add_friend_to_friday(&self, email: &str, friday: &Friday) -> Result<()> {
            self.inner.add_friend_to_friday(email, friday).await
        }
        async fn remove_friend_from_friday(&self, email: &str, date: DateTime<Utc>) -> Result<()> {
            self.inner.remove_friend_from_friday(email, date).await
        }
    }

    fn cached() -> (CachedAttendanceStore<CountingStore>, Arc<CountingStore>) {
        let store = Arc::new(CountingStore::default());
        (
            CachedAttendanceStore::new(store.clone(), CacheTtls::default()),
            store,
        )
    }

    #[tokio::test]
    async fn test_friend_lookup_is_cached() {
        let (cached, store) = cached();
        store.inner.add_friend("ted@tedlasso.com", "Ted").await.unwrap();

        cached.get_friend_by_email("ted@tedlasso.com").await.unwrap();
        let friend = cached.get_friend_by_email("TED@tedlasso.com").await.unwrap();

        assert_eq!(friend.name, "Ted");
        assert_eq!(store.friend_lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_friend_is_negatively_cached() {
        let (cached, store) = cached();

        for _ in 0..3 {
            assert!(cached
                .get_friend_by_email("nate@richmond.com")
                .await
                .unwrap_err()
                .is_not_found());
        }

        assert_eq!(store.friend_lookups.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_add_friend_overrides_negative_entry() {
        let (cached, _store) = cached();
        assert!(cached.get_friend_by_email("nate@richmond.com").await.is_err());

        cached.add_friend("nate@richmond.com", "Nate").await.unwrap();

        let friend = cached.get_friend_by_email("nate@richmond.com").await.unwrap();
        assert_eq!(friend.name, "Nate");
    }

    #[tokio::test]
    async fn test_set_preferences_reseeds_friend() {
        let (cached, _store) = cached();
        cached.add_friend("keeley@richmond.com", "Keeley").await.unwrap();
        let preferences = Preferences {
            toppings: vec![rsvp_core::friday::Topping::Pineapple],
            ..Default::default()
        };

        cached
            .set_preferences("keeley@richmond.com", &preferences)
            .await
            .unwrap();

        assert_eq!(
            cached.get_preferences("keeley@richmond.com").await.unwrap(),
            preferences
        );
    }

    #[tokio::test]
    async fn test_upcoming_fridays_cached_until_write() {
        let (cached, store) = cached();
        let friday = Friday::new(Utc::now() + ChronoDuration::days(3));
        cached.add_friday(&friday).await.unwrap();

        assert_eq!(cached.get_upcoming_fridays(30).await.unwrap().len(), 1);
        assert_eq!(cached.get_upcoming_fridays(30).await.unwrap().len(), 1);
        assert_eq!(store.friday_lookups.load(Ordering::SeqCst), 1);

        cached
            .add_friend_to_friday("roy@richmond.com", &friday)
            .await
            .unwrap();

        let upcoming = cached.get_upcoming_fridays(30).await.unwrap();
        assert_eq!(upcoming[0].guests, vec!["roy@richmond.com"]);
        assert_eq!(store.friday_lookups.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_write_during_slow_listing_is_not_lost() {
        let store = Arc::new(CountingStore::default());
        let cached = Arc::new(CachedAttendanceStore::new(
            store.clone(),
            CacheTtls::default(),
        ));
        let friday = Friday::new(Utc::now() + ChronoDuration::days(3));
        cached.add_friday(&friday).await.unwrap();
        store.slow_fridays.store(true, Ordering::SeqCst);

        let reader = {
            let cached = cached.clone();
            tokio::spawn(async move { cached.get_upcoming_fridays(30).await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(30)).await;
        cached
            .add_friend_to_friday("roy@richmond.com", &friday)
            .await
            .unwrap();
        let stale = reader.await.unwrap().unwrap();
        assert!(stale[0].guests.is_empty());

        store.slow_fridays.store(false, Ordering::SeqCst);
        let upcoming = cached.get_upcoming_fridays(30).await.unwrap();
        assert_eq!(upcoming[0].guests, vec!["roy@richmond.com"]);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_cache_alone() {
        let (cached, store) = cached();
        let friday = Friday::new(Utc::now() + ChronoDuration::days(3)).with_max_guests(0);
        cached.add_friday(&friday).await.unwrap();
        cached.get_upcoming_fridays(30).await.unwrap();

        let result = cached.add_friend_to_friday("roy@richmond.com", &friday).await;

        assert!(matches!(result, Err(RepositoryError::CapacityReached { .. })));
        cached.get_upcoming_fridays(30).await.unwrap();
        assert_eq!(store.friday_lookups.load(Ordering::SeqCst), 1);
    }
}
