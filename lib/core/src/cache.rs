//! Memoization for derived hierarchy data.
//!
//! Closures, information values and semantic-value vectors are computed on
//! first use and then only read. A [`SingleFlightCache`] makes sure that only
//! one caller computes a given key while the others wait for that result;
//! keys that are already warm are served under a shared read lock.

use ahash::AHashMap;
use parking_lot::{Mutex, RwLock};
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// Statistics for cache monitoring
#[derive(Debug, Default)]
pub struct CacheStats {
    /// Lookups answered from a warm entry
    pub hits: AtomicU64,
    /// Lookups that ran the fill function
    pub misses: AtomicU64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let total = hits + self.misses.load(Ordering::Relaxed);
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

struct Slot<V> {
    value: OnceLock<Arc<V>>,
    fill: Mutex<()>,
}

impl<V> Slot<V> {
    fn new() -> Self {
        Self {
            value: OnceLock::new(),
            fill: Mutex::new(()),
        }
    }
}

/// Keyed memo table with one in-flight computation per key
pub struct SingleFlightCache<K, V> {
    slots: RwLock<AHashMap<K, Arc<Slot<V>>>>,
    stats: CacheStats,
}

impl<K, V> SingleFlightCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            slots: RwLock::new(AHashMap::new()),
            stats: CacheStats::default(),
        }
    }

    /// Warm value for `key`, if any
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.slots
            .read()
            .get(key)
            .and_then(|slot| slot.value.get().cloned())
    }

    /// Return the cached value or compute it with `fill`.
    ///
    /// Concurrent callers for the same cold key block on that key's fill lock;
    /// the first one runs `fill`, the rest reuse its value. A failed fill
    /// leaves the key cold so a later call retries.
    pub fn get_or_try_insert_with<E, F>(&self, key: K, fill: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(&key) {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(value);
        }

        let slot = self
            .slots
            .write()
            .entry(key)
            .or_insert_with(|| Arc::new(Slot::new()))
            .clone();

        let _guard = slot.fill.lock();
        if let Some(value) = slot.value.get() {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(value.clone());
        }

        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        let value = Arc::new(fill()?);
        // only the fill-lock holder sets the cell
        let _ = slot.value.set(value.clone());
        Ok(value)
    }

    /// Number of warm entries
    pub fn len(&self) -> usize {
        self.slots
            .read()
            .values()
            .filter(|slot| slot.value.get().is_some())
            .count()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

impl<K, V> Default for SingleFlightCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
