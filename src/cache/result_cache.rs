//! LRU + TTL result cache
//!
//! Entries live in an [`lru::LruCache`] (hash map plus intrusive doubly linked
//! list), so lookups, recency updates and eviction are all O(1). Expiry is
//! lazy: an entry past its deadline is dropped the next time it is touched, or
//! in bulk by [`ResultCache::clear_expired`].
//!
//! A single mutex guards each cache instance, making the lookup/evict/insert
//! sequence atomic when the cache is shared between threads.

use crate::cache::clock::{Clock, MonotonicClock};
use lru::LruCache;
use serde::Serialize;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Default number of entries held before LRU eviction kicks in
pub const DEFAULT_CAPACITY: usize = 50;

/// Default entry lifetime (10 minutes)
pub const DEFAULT_TTL_MS: i64 = 600_000;

/// Derive the cache key for an analytic call.
///
/// The operation name and the full parameter tuple are serialized together,
/// so calls that differ in any parameter never share a key.
pub fn cache_key<P>(operation: &str, params: &P) -> String
where
    P: Serialize + fmt::Debug + ?Sized,
{
    match serde_json::to_string(&(operation, params)) {
        Ok(key) => key,
        Err(e) => {
            tracing::warn!(operation, error = %e, "Falling back to debug cache key");
            format!("{}:{:?}", operation, params)
        }
    }
}

struct CacheEntry<V> {
    value: V,
    /// Absolute deadline on the cache's clock, in milliseconds
    expires_at: i64,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: i64) -> bool {
        now > self.expires_at
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    hits: u64,
    misses: u64,
    evictions: u64,
    expirations: u64,
}

struct Inner<V> {
    /// `None` when the cache was built with zero capacity
    entries: Option<LruCache<String, CacheEntry<V>>>,
    counters: Counters,
}

/// Generic least-recently-used cache with per-entry time-to-live.
///
/// Values are handed out as clones; the cache keeps exclusive ownership of
/// what it stores.
pub struct ResultCache<V> {
    inner: Mutex<Inner<V>>,
    capacity: usize,
    default_ttl_ms: i64,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> ResultCache<V> {
    /// Create a cache using the monotonic clock.
    ///
    /// A capacity of 0 or a TTL of 0 or less disables caching: nothing is
    /// stored and every lookup misses.
    pub fn new(capacity: usize, default_ttl_ms: i64) -> Self {
        Self::with_clock(capacity, default_ttl_ms, Arc::new(MonotonicClock::new()))
    }

    /// Create a cache driven by a caller-supplied clock
    pub fn with_clock(capacity: usize, default_ttl_ms: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: NonZeroUsize::new(capacity).map(LruCache::new),
                counters: Counters::default(),
            }),
            capacity,
            default_ttl_ms,
            clock,
        }
    }

    /// Look up a key.
    ///
    /// Expired entries are removed and reported as a miss. A hit marks the key
    /// as most recently used.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now_millis();
        let mut guard = self.lock();
        let Inner { entries, counters } = &mut *guard;

        let Some(entries) = entries.as_mut() else {
            counters.misses += 1;
            return None;
        };

        match entries.peek(key).map(|entry| entry.is_expired(now)) {
            None => {
                counters.misses += 1;
                tracing::trace!(key, "Cache miss");
                None
            }
            Some(true) => {
                entries.pop(key);
                counters.misses += 1;
                counters.expirations += 1;
                tracing::debug!(key, "Cache entry expired");
                None
            }
            Some(false) => {
                counters.hits += 1;
                tracing::trace!(key, "Cache hit");
                entries.get(key).map(|entry| entry.value.clone())
            }
        }
    }

    /// Store a value with the default TTL
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.set_with_ttl(key, value, self.default_ttl_ms);
    }

    /// Store a value that expires `ttl_ms` milliseconds from now.
    ///
    /// When the cache is full and the key is new, the least recently used
    /// entry is evicted first. A TTL of 0 or less stores nothing and drops any
    /// existing entry for the key.
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl_ms: i64) {
        let key = key.into();
        let now = self.clock.now_millis();
        let mut guard = self.lock();
        let Inner { entries, counters } = &mut *guard;

        let Some(entries) = entries.as_mut() else {
            return;
        };

        if ttl_ms <= 0 {
            entries.pop(key.as_str());
            return;
        }

        let is_new = !entries.contains(key.as_str());
        let entry = CacheEntry {
            value,
            expires_at: now.saturating_add(ttl_ms),
        };

        // `push` hands back either the evicted LRU pair or the replaced entry
        if let Some((evicted, _)) = entries.push(key, entry) {
            if is_new {
                counters.evictions += 1;
                tracing::debug!(evicted = %evicted, "Evicted least recently used entry");
            }
        }
    }

    /// Whether a live entry exists for `key`. Does not change recency.
    pub fn has(&self, key: &str) -> bool {
        let now = self.clock.now_millis();
        let mut guard = self.lock();
        let Inner { entries, counters } = &mut *guard;

        let Some(entries) = entries.as_mut() else {
            return false;
        };

        match entries.peek(key).map(|entry| entry.is_expired(now)) {
            None => false,
            Some(true) => {
                entries.pop(key);
                counters.expirations += 1;
                false
            }
            Some(false) => true,
        }
    }

    /// Return the cached value for `key`, computing and storing it on a miss
    pub fn get_or_insert_with<F>(&self, key: &str, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(key) {
            return value;
        }

        // Computed outside the lock: analyses are deterministic, so a racing
        // miss on the same key only repeats work.
        let value = compute();
        self.set(key, value.clone());
        value
    }

    /// Drop every entry
    pub fn clear(&self) {
        if let Some(entries) = self.lock().entries.as_mut() {
            entries.clear();
        }
    }

    /// Drop entries whose TTL has elapsed, returning how many were removed
    pub fn clear_expired(&self) -> usize {
        let now = self.clock.now_millis();
        let mut guard = self.lock();
        let Inner { entries, counters } = &mut *guard;

        let Some(entries) = entries.as_mut() else {
            return 0;
        };

        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            entries.pop(key.as_str());
        }

        counters.expirations += expired.len() as u64;
        if !expired.is_empty() {
            tracing::debug!(removed = expired.len(), "Cleared expired cache entries");
        }
        expired.len()
    }

    /// Number of physically stored entries (expired ones included until touched)
    pub fn len(&self) -> usize {
        self.lock().entries.as_ref().map_or(0, LruCache::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn default_ttl_ms(&self) -> i64 {
        self.default_ttl_ms
    }

    /// Snapshot of hit/miss/eviction counters
    pub fn stats(&self) -> CacheStats {
        let guard = self.lock();
        CacheStats {
            hits: guard.counters.hits,
            misses: guard.counters.misses,
            evictions: guard.counters.evictions,
            expirations: guard.counters.expirations,
            entries: guard.entries.as_ref().map_or(0, LruCache::len),
            capacity: self.capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<V>> {
        // Cache state stays consistent even if a holder panicked
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V: Clone> Default for ResultCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL_MS)
    }
}

/// Cache usage statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub entries: usize,
    pub capacity: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Entries: {}/{}, Hits: {}, Misses: {}, Evictions: {}, Expired: {}, Hit rate: {:.1}%",
            self.entries,
            self.capacity,
            self.hits,
            self.misses,
            self.evictions,
            self.expirations,
            self.hit_rate() * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;

    fn manual_cache(capacity: usize, ttl_ms: i64) -> (ResultCache<String>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        let cache = ResultCache::with_clock(capacity, ttl_ms, clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_set_then_get_round_trip() {
        let (cache, _clock) = manual_cache(3, 1_000);
        cache.set("k", "v".to_string());

        assert_eq!(cache.get("k"), Some("v".to_string()));
        assert!(cache.has("k"));
        assert_eq!(cache.get("missing"), None);
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let (cache, clock) = manual_cache(3, 1_000);
        cache.set("k", "v".to_string());

        // Still live exactly at the deadline
        clock.advance(1_000);
        assert_eq!(cache.get("k"), Some("v".to_string()));

        clock.advance(1);
        assert_eq!(cache.get("k"), None);
        // Lazily removed on access
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn test_per_entry_ttl_overrides_default() {
        let (cache, clock) = manual_cache(3, 1_000);
        cache.set_with_ttl("short", "a".to_string(), 10);
        cache.set("long", "b".to_string());

        clock.advance(11);
        assert!(!cache.has("short"));
        assert!(cache.has("long"));
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let (cache, _clock) = manual_cache(2, 1_000);
        cache.set("a", "1".to_string());
        cache.set("b", "2".to_string());

        // Touch "a" so "b" becomes least recently used
        assert!(cache.get("a").is_some());
        cache.set("c", "3".to_string());

        assert!(cache.has("a"));
        assert!(!cache.has("b"));
        assert!(cache.has("c"));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let (cache, _clock) = manual_cache(2, 1_000);
        cache.set("a", "1".to_string());
        cache.set("b", "2".to_string());
        cache.set("a", "updated".to_string());

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), Some("updated".to_string()));
        assert_eq!(cache.get("b"), Some("2".to_string()));
        assert_eq!(cache.stats().evictions, 0);
    }

    #[test]
    fn test_overwrite_refreshes_recency_and_expiry() {
        let (cache, clock) = manual_cache(2, 1_000);
        cache.set("a", "1".to_string());
        cache.set("b", "2".to_string());

        clock.advance(900);
        cache.set("a", "again".to_string());
        cache.set("c", "3".to_string());

        // "b" was least recently touched
        assert!(!cache.has("b"));

        clock.advance(500);
        assert_eq!(cache.get("a"), Some("again".to_string()));
    }

    #[test]
    fn test_has_does_not_promote() {
        let (cache, _clock) = manual_cache(2, 1_000);
        cache.set("a", "1".to_string());
        cache.set("b", "2".to_string());

        assert!(cache.has("a"));
        cache.set("c", "3".to_string());

        assert!(!cache.has("a"));
        assert!(cache.has("b"));
    }

    #[test]
    fn test_clear_expired() {
        let (cache, clock) = manual_cache(5, 1_000);
        cache.set_with_ttl("a", "1".to_string(), 100);
        cache.set_with_ttl("b", "2".to_string(), 100);
        cache.set("c", "3".to_string());

        clock.advance(200);
        assert_eq!(cache.clear_expired(), 2);
        assert_eq!(cache.len(), 1);
        assert!(cache.has("c"));
    }

    #[test]
    fn test_clear() {
        let (cache, _clock) = manual_cache(5, 1_000);
        cache.set("a", "1".to_string());
        cache.set("b", "2".to_string());

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_non_positive_ttl_disables_caching() {
        let (cache, _clock) = manual_cache(5, 0);
        cache.set("a", "1".to_string());
        assert_eq!(cache.get("a"), None);

        let (cache, _clock) = manual_cache(5, 1_000);
        cache.set("a", "1".to_string());
        cache.set_with_ttl("a", "2".to_string(), -5);
        assert_eq!(cache.get("a"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_capacity_never_stores() {
        let (cache, _clock) = manual_cache(0, 1_000);
        cache.set("a", "1".to_string());

        assert_eq!(cache.get("a"), None);
        assert!(!cache.has("a"));
        assert_eq!(cache.clear_expired(), 0);
    }

    #[test]
    fn test_get_or_insert_with_computes_once() {
        let (cache, _clock) = manual_cache(5, 1_000);
        let mut calls = 0;

        let first = cache.get_or_insert_with("k", || {
            calls += 1;
            "computed".to_string()
        });
        let second = cache.get_or_insert_with("k", || {
            calls += 1;
            "recomputed".to_string()
        });

        assert_eq!(first, "computed");
        assert_eq!(second, "computed");
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_stats_counts_hits_and_misses() {
        let (cache, _clock) = manual_cache(5, 1_000);
        cache.set("a", "1".to_string());
        cache.get("a");
        cache.get("a");
        cache.get("b");

        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert!((stats.hit_rate() - 2.0 / 3.0).abs() < 1e-9);
        assert!(stats.to_string().contains("Hits: 2"));
    }

    #[test]
    fn test_cache_key_distinguishes_parameters() {
        let a = cache_key("mood_sleep_correlation", &30u32);
        let b = cache_key("mood_sleep_correlation", &7u32);
        let c = cache_key("mood_exercise_correlation", &30u32);

        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, cache_key("mood_sleep_correlation", &30u32));
        assert_eq!(a, r#"["mood_sleep_correlation",30]"#);
    }

    #[test]
    fn test_shared_across_threads() {
        let cache: Arc<ResultCache<u64>> = Arc::new(ResultCache::new(8, 60_000));

        let handles: Vec<_> = (0..4u64)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..100u64 {
                        let key = format!("k{}", (t * 100 + i) % 16);
                        cache.set(key.clone(), i);
                        cache.get(&key);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cache.len() <= 8);
    }
}
