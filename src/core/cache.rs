// src/core/cache.rs

use log::trace;
use std::{
    collections::HashMap,
    fmt,
    hash::Hash,
    sync::{Mutex, MutexGuard, PoisonError},
    time::{Duration, Instant},
};

/// A value together with the moment it was stored.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() < ttl
    }
}

/// An in-memory key/value cache whose entries expire after a fixed TTL.
///
/// Expired entries are evicted lazily, on the next read of their key.
/// All operations go through one mutex, so a read-check-then-write
/// sequence performed with [`TimedCache::get_or_insert_with`] cannot lose
/// an update to a concurrent query.
pub struct TimedCache<K, V> {
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
    ttl: Duration,
}

impl<K, V> fmt::Debug for TimedCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimedCache")
            .field("ttl", &self.ttl)
            .field("len", &self.lock().len())
            .finish()
    }
}

impl<K, V> TimedCache<K, V> {
    /// Creates an empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Drops every entry, fresh or not.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic in another query must not take the cache down with it.
    fn lock(&self) -> MutexGuard<'_, HashMap<K, CacheEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K, V> TimedCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: Clone,
{
    /// Returns the value stored under `key` if it is still fresh.
    /// An expired entry is removed and reported as absent.
    pub fn try_get(&self, key: &K) -> Option<V> {
        let mut entries = self.lock();
        Self::fresh_value(&mut entries, key, self.ttl)
    }

    /// Stores `value` under `key`, replacing anything already there.
    pub fn set(&self, key: K, value: V) {
        self.lock().insert(
            key,
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn remove(&self, key: &K) {
        self.lock().remove(key);
    }

    /// Returns the fresh value under `key`, or computes, stores and returns a new one.
    ///
    /// The lock is held while `compute` runs, so concurrent callers for the
    /// same cache wait for the first computation instead of repeating it.
    pub fn get_or_insert_with<F>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        let mut entries = self.lock();
        if let Some(value) = Self::fresh_value(&mut entries, &key, self.ttl) {
            trace!("Cache hit for {:?}", key);
            return value;
        }

        trace!("Cache miss for {:?}", key);
        let value = compute();
        entries.insert(
            key,
            CacheEntry {
                value: value.clone(),
                stored_at: Instant::now(),
            },
        );
        value
    }

    /// Like [`TimedCache::get_or_insert_with`], for a computation that can
    /// fail. An error is returned as is and nothing is stored.
    pub fn get_or_try_insert_with<F, E>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let mut entries = self.lock();
        if let Some(value) = Self::fresh_value(&mut entries, &key, self.ttl) {
            trace!("Cache hit for {:?}", key);
            return Ok(value);
        }

        trace!("Cache miss for {:?}", key);
        let value = compute()?;
        entries.insert(
            key,
            CacheEntry {
                value: value.clone(),
                stored_at: Instant::now(),
            },
        );
        Ok(value)
    }

    fn fresh_value(
        entries: &mut HashMap<K, CacheEntry<V>>,
        key: &K,
        ttl: Duration,
    ) -> Option<V> {
        match entries.get(key) {
            Some(entry) if entry.is_fresh(ttl) => Some(entry.value.clone()),
            Some(_) => {
                trace!("Evicting expired cache entry {:?}", key);
                entries.remove(key);
                None
            }
            None => None,
        }
    }
}
