//! In-memory cache with per-record expiry

use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// A single cached value
struct CacheRecord {
    value: Arc<dyn Any + Send + Sync>,
    inserted_at: Instant,
    ttl: Duration,
}

impl CacheRecord {
    /// Expired once strictly more than `ttl` has elapsed
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) > self.ttl
    }
}

/// Keyed cache whose records expire after their own time-to-live
///
/// Safe to share between threads. Expired records are not evicted, they
/// are overwritten by the next `set` for the same key. Concurrent writers
/// for one key race and the last one wins.
#[derive(Default)]
pub struct TtlCache {
    records: RwLock<HashMap<String, CacheRecord>>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a live value, `None` when missing, expired, or of another type
    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let records = self.read();
        let record = records.get(key)?;

        if record.is_expired(Instant::now()) {
            debug!("Cache record {} expired", key);
            return None;
        }
        record.value.downcast_ref::<T>().cloned()
    }

    /// Store a value, replacing any previous record for `key`
    pub fn set<T>(&self, key: impl Into<String>, value: T, ttl: Duration)
    where
        T: Send + Sync + 'static,
    {
        let record = CacheRecord {
            value: Arc::new(value),
            inserted_at: Instant::now(),
            ttl,
        };
        self.write().insert(key.into(), record);
    }

    /// Get a live value or compute, store and return a fresh one
    pub fn get_or_insert_with<T, F>(&self, key: &str, ttl: Duration, compute: F) -> T
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        if let Some(value) = self.get::<T>(key) {
            return value;
        }

        debug!("Cache miss for {}, recomputing", key);
        let value = compute();
        self.set(key, value.clone(), ttl);
        value
    }

    /// Number of stored records, expired ones included
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every record
    pub fn clear(&self) {
        self.write().clear();
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheRecord>> {
        match self.records.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheRecord>> {
        match self.records.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
