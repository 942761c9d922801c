//! Time-bounded memoization of slow lookups.
//!
//! A [`TtlCache`] remembers the result of a refresh function per key for a
//! fixed window. After the window elapses the next `get` calls the refresh
//! function again. There is no eviction beyond that: key cardinality is bounded
//! by the domain (emails, a handful of day counts).

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::CacheError;

/// Produces a fresh value for a cache key.
#[async_trait]
pub trait Refresh<T, E>: Send + Sync {
    async fn refresh(&self, key: &str) -> Result<T, E>;
}

/// Adapts an async closure into a [`Refresh`] implementation.
pub struct RefreshFn<F>(pub F);

#[async_trait]
impl<T, E, F, Fut> Refresh<T, E> for RefreshFn<F>
where
    T: Send + 'static,
    E: Send + 'static,
    F: Fn(String) -> Fut + Send + Sync,
    Fut: Future<Output = Result<T, E>> + Send,
{
    async fn refresh(&self, key: &str) -> Result<T, E> {
        (self.0)(key.to_string()).await
    }
}

#[derive(Debug, Clone)]
struct CacheValue<T> {
    value: T,
    created_at: Instant,
}

impl<T> CacheValue<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            created_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() > ttl
    }
}

/// Generic TTL cache keyed by string.
///
/// A failed refresh surfaces its error and leaves whatever was cached before
/// untouched; it never serves the stale value instead.
///
/// A refresh that overlaps a `clear` or `store` is returned to its caller but
/// not cached, so a write that invalidates the cache always wins.
pub struct TtlCache<T, E = CacheError> {
    ttl: Duration,
    store: RwLock<HashMap<String, CacheValue<T>>>,
    refresh: Option<Arc<dyn Refresh<T, E>>>,
    /// Bumped under the write lock by every `clear` and `store`.
    generation: AtomicU64,
}

impl<T, E> TtlCache<T, E>
where
    T: Clone + Send + Sync,
    E: From<CacheError>,
{
    /// Creates a cache that refreshes misses and expired entries through `refresh`.
    pub fn new(ttl: Duration, refresh: impl Refresh<T, E> + 'static) -> Self {
        Self {
            ttl,
            store: RwLock::new(HashMap::new()),
            refresh: Some(Arc::new(refresh)),
            generation: AtomicU64::new(0),
        }
    }

    /// Creates a cache that only serves values seeded with [`TtlCache::store`].
    ///
    /// A miss is reported as [`CacheError::NotFound`].
    pub fn without_refresh(ttl: Duration) -> Self {
        Self {
            ttl,
            store: RwLock::new(HashMap::new()),
            refresh: None,
            generation: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value, refreshing it when absent or expired.
    pub async fn get(&self, key: &str) -> Result<T, E> {
        {
            let store = self.store.read().await;
            if let Some(entry) = store.get(key) {
                if !entry.is_expired(self.ttl) {
                    return Ok(entry.value.clone());
                }
            }
        }

        let Some(refresh) = &self.refresh else {
            return Err(CacheError::NotFound(key.to_string()).into());
        };

        // The lock is not held across the refresh; concurrent misses may both refresh.
        let generation = self.generation.load(Ordering::SeqCst);
        let value = refresh.refresh(key).await?;

        let mut store = self.store.write().await;
        if self.generation.load(Ordering::SeqCst) == generation {
            store.insert(key.to_string(), CacheValue::new(value.clone()));
        }
        Ok(value)
    }

    /// True only if an entry exists and has not expired.
    pub async fn has(&self, key: &str) -> bool {
        self.store
            .read()
            .await
            .get(key)
            .is_some_and(|entry| !entry.is_expired(self.ttl))
    }

    /// Creates or overwrites an entry, stamped with the current time.
    pub async fn store(&self, key: &str, value: T) {
        let mut store = self.store.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        store.insert(key.to_string(), CacheValue::new(value));
    }

    /// Drops every entry.
    pub async fn clear(&self) {
        let mut store = self.store.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        store.clear();
    }
}
