//! Per-entry TTL cache with lazy eviction.

use std::borrow::Borrow;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::trace;

use super::clock::{Clock, SystemClock};
use super::stats::{CacheStats, Counters};

/// Longest lifetime an entry can get; larger TTLs are clamped to it.
const MAX_ENTRY_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Key-value store where every entry expires `ttl` after it was set.
///
/// Values are handed out as clones. Store `Arc<T>` for anything larger than
/// a few words: callers then share an immutable snapshot and cannot alter
/// what other readers see.
///
/// The map is sharded and safe to share across tasks and threads.
pub struct TtlCache<K, V> {
    entries: DashMap<K, CacheEntry<V>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    counters: Counters,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    /// Create a cache driven by the system clock.
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }

    /// Create a cache driven by the given clock.
    pub fn with_clock(ttl: Duration, clock: impl Clock + 'static) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock: Arc::new(clock),
            counters: Counters::default(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Store `value` under `key`, replacing any previous entry and restarting
    /// its TTL.
    pub fn set(&self, key: K, value: V) {
        let now = self.clock.now();
        let expires_at = now
            .checked_add(self.ttl.min(MAX_ENTRY_TTL))
            .unwrap_or(now);
        self.entries.insert(key, CacheEntry { value, expires_at });
    }

    /// Return the value for `key` if it has not expired.
    ///
    /// An expired entry is removed by this call.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now();

        // The read guard must be released before the entry can be removed.
        let live = match self.entries.get(key) {
            None => {
                self.counters.miss();
                return None;
            }
            Some(entry) if entry.is_live(now) => Some(entry.value.clone()),
            Some(_) => None,
        };

        if let Some(value) = live {
            self.counters.hit();
            return Some(value);
        }

        // Another task may have refreshed the entry in between; only drop it
        // if it is still expired.
        if self
            .entries
            .remove_if(key, |_, entry| !entry.is_live(now))
            .is_some()
        {
            trace!("Evicted expired cache entry");
            self.counters.expired();
        }
        self.counters.miss();
        None
    }

    /// Remove `key` regardless of expiry, returning its value.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.remove(key).map(|(_, entry)| entry.value)
    }

    /// Number of stored entries, including expired entries not yet read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot(self.entries.len())
    }
}
