//! In-memory TTL cache with request deduplication
//!
//! Provides a `TtlCache` that stores values with per-entry expiry and shares a
//! single in-flight operation between concurrent callers asking for the same
//! key, so a burst of identical requests triggers exactly one fetch.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use tracing::trace;

/// Default time-to-live for cached entries: 2 hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// A cached value together with its expiry deadline.
#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// A pending fetch shared between every caller waiting on the same key.
type SharedFetch<V, E> = Shared<BoxFuture<'static, Result<V, E>>>;

/// In-memory key-value cache with per-entry TTL and async deduplication.
///
/// Cloning the cache produces another handle to the same underlying maps, so
/// one instance can be constructed at startup and handed to every consumer.
/// Values and errors must be cheap to clone; each waiter on a deduplicated
/// fetch receives its own clone of the single outcome.
pub struct TtlCache<V, E> {
    inner: Arc<CacheInner<V, E>>,
}

struct CacheInner<V, E> {
    default_ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    in_flight: Mutex<HashMap<String, SharedFetch<V, E>>>,
}

impl<V, E> Clone for TtlCache<V, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V, E> std::fmt::Debug for TtlCache<V, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("default_ttl", &self.inner.default_ttl)
            .field("entries", &lock(&self.inner.entries).len())
            .field("in_flight", &lock(&self.inner.in_flight).len())
            .finish()
    }
}

/// Locks a map, recovering the guard if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<V, E> TtlCache<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Creates an empty cache whose entries default to `default_ttl`.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                default_ttl,
                entries: Mutex::new(HashMap::new()),
                in_flight: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Returns the value for `key` if present and unexpired.
    ///
    /// An expired entry counts as absent and is removed as a side effect.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = lock(&self.inner.entries);
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Stores `value` under `key`, expiring after the override or default TTL.
    ///
    /// Any prior entry for the key is replaced wholesale.
    pub fn set(&self, key: &str, value: V, ttl: Option<Duration>) {
        self.inner.store(key, value, ttl);
    }

    /// Whether a fresh entry exists for `key`.
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of entries currently held, expired ones included until purged.
    pub fn len(&self) -> usize {
        lock(&self.inner.entries).len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Empties the entry store and the in-flight tracking.
    pub fn clear(&self) {
        lock(&self.inner.entries).clear();
        lock(&self.inner.in_flight).clear();
    }

    /// Returns the cached value for `key`, or runs `factory` to produce it.
    ///
    /// At most one factory runs per key at any time. Concurrent callers for
    /// the same key await the same pending operation and all receive the
    /// single outcome. On success the value is stored at `ttl` before the
    /// in-flight registration is cleared; failures are never cached.
    pub async fn dedupe<F, Fut>(&self, key: &str, factory: F, ttl: Option<Duration>) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let shared = {
            let mut in_flight = lock(&self.inner.in_flight);

            // A fetch for this key may have settled between the cache check
            // and taking the lock.
            if let Some(value) = self.get(key) {
                return Ok(value);
            }

            if let Some(existing) = in_flight.get(key) {
                trace!(key, "joining in-flight request");
                existing.clone()
            } else {
                let inner = Arc::clone(&self.inner);
                let owned_key = key.to_string();
                let fut = factory();
                let wrapped = async move {
                    let result = fut.await;
                    if let Ok(value) = &result {
                        inner.store(&owned_key, value.clone(), ttl);
                    }
                    lock(&inner.in_flight).remove(&owned_key);
                    result
                }
                .boxed()
                .shared();

                in_flight.insert(key.to_string(), wrapped.clone());
                wrapped
            }
        };

        shared.await
    }
}

impl<V, E> CacheInner<V, E> {
    fn store(&self, key: &str, value: V, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
        };
        lock(&self.entries).insert(key.to_string(), entry);
    }
}
