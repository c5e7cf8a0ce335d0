//! In-memory key/value cache with per-entry expiry and a size cap.
//!
//! The cache is process-local and empty after a restart. When it is full,
//! expired entries are swept first; if it is still full the least recently
//! used entry is evicted.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use lru::LruCache;
use tracing::{debug, warn};

/// Entries held per cache unless configured otherwise.
pub const DEFAULT_MAX_ENTRIES: usize = 1024;

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// Thread-safe TTL cache bounded to `max_entries`.
pub struct TtlCache<K: Hash + Eq, V> {
    entries: Mutex<LruCache<K, Entry<V>>>,
    ttl: Duration,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self::with_max_entries(ttl, DEFAULT_MAX_ENTRIES)
    }

    /// A cap of 0 is treated as 1.
    pub fn with_max_entries(ttl: Duration, max_entries: usize) -> Self {
        let cap = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(cap)),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn max_entries(&self) -> usize {
        self.lock_entries().cap().get()
    }

    /// Lock the entries, recovering from poison. A poisoned cache can at
    /// worst serve a stale value until it expires.
    fn lock_entries(&self) -> MutexGuard<'_, LruCache<K, Entry<V>>> {
        self.entries.lock().unwrap_or_else(|poisoned| {
            warn!("TTL cache mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    /// Lookup as of `now`. Expired entries are evicted on access.
    pub fn get_at(&self, key: &K, now: Instant) -> Option<V> {
        let mut entries = self.lock_entries();
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Some(entry.value.clone()),
            Some(_) => {
                entries.pop(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: K, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    pub fn insert_at(&self, key: K, value: V, now: Instant) {
        let expires_at = now + self.ttl;
        let mut entries = self.lock_entries();
        if entries.len() >= entries.cap().get() && !entries.contains(&key) {
            let swept = sweep_expired(&mut entries, now);
            if swept > 0 {
                debug!("TTL cache swept {} expired entries", swept);
            }
        }
        entries.put(key, Entry { value, expires_at });
    }

    /// Drop every entry that has expired as of `now`. Returns how many went.
    pub fn purge_expired_at(&self, now: Instant) -> usize {
        sweep_expired(&mut self.lock_entries(), now)
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.lock_entries().pop(key).map(|entry| entry.value)
    }

    /// Drop every entry whose key matches the predicate.
    pub fn remove_where<F>(&self, mut predicate: F)
    where
        F: FnMut(&K) -> bool,
    {
        let mut entries = self.lock_entries();
        let doomed: Vec<K> = entries
            .iter()
            .filter(|(key, _)| predicate(key))
            .map(|(key, _)| key.clone())
            .collect();
        for key in doomed {
            entries.pop(&key);
        }
    }

    pub fn clear(&self) {
        self.lock_entries().clear();
    }

    /// Number of stored entries, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.lock_entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn sweep_expired<K, V>(entries: &mut LruCache<K, Entry<V>>, now: Instant) -> usize
where
    K: Eq + Hash + Clone,
{
    let expired: Vec<K> = entries
        .iter()
        .filter(|(_, entry)| entry.expires_at <= now)
        .map(|(key, _)| key.clone())
        .collect();
    for key in &expired {
        entries.pop(key);
    }
    expired.len()
}
