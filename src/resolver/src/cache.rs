//! Time-boxed candidate cache
//!
//! Maps a source key (`roles@/subscriptions/x`) to the candidate list fetched
//! for it, so repeated resolutions within one invocation avoid repeated
//! listing calls.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::candidate::Candidate;

/// Cached candidate list
#[derive(Debug, Clone)]
struct CacheEntry {
    /// Candidates in source order
    candidates: Arc<[Candidate]>,
    /// When the fetch completed
    fetched_at: Instant,
}

impl CacheEntry {
    fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates: Arc::from(candidates),
            fetched_at: Instant::now(),
        }
    }

    /// Fresh while strictly younger than `ttl`
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

/// One lockable slot per key; holding the lock across a fetch makes
/// concurrent callers for the same key wait for a single fetch.
type Slot = Arc<Mutex<Option<CacheEntry>>>;

/// Process-scoped candidate cache with TTL expiry
///
/// # Examples
///
/// ```
/// use pimctl_resolver::{Candidate, ResultCache};
/// use std::convert::Infallible;
/// use std::time::Duration;
///
/// let cache = ResultCache::new();
/// let ttl = Duration::from_secs(300);
///
/// let roles = cache
///     .get_or_fetch("roles@all", ttl, || Ok::<_, Infallible>(vec![Candidate::new("Owner", "1")]))
///     .unwrap();
/// assert_eq!(roles.len(), 1);
///
/// // Second call within the TTL is served from the cache
/// let again = cache
///     .get_or_fetch("roles@all", ttl, || -> Result<Vec<Candidate>, Infallible> { unreachable!() })
///     .unwrap();
/// assert_eq!(again.len(), 1);
/// ```
#[derive(Default)]
pub struct ResultCache {
    slots: DashMap<String, Slot>,
    stats: DashMap<&'static str, usize>,
}

impl ResultCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached candidates for `key`, fetching them on a miss
    ///
    /// # Arguments
    ///
    /// * `key` - Source key, see [`SourceKey::cache_key`](crate::SourceKey::cache_key)
    /// * `ttl` - Entries at least this old are treated as absent
    /// * `fetcher` - Listing call; invoked only on a miss or stale entry
    ///
    /// # Returns
    ///
    /// The candidates in source order. A fetch error is returned unchanged and
    /// leaves any existing (stale) entry untouched.
    pub fn get_or_fetch<F, E>(&self, key: &str, ttl: Duration, fetcher: F) -> Result<Arc<[Candidate]>, E>
    where
        F: FnOnce() -> Result<Vec<Candidate>, E>,
    {
        // Clone the slot out so the map shard is not held during the fetch
        let slot: Slot = Arc::clone(&*self.slots.entry(key.to_string()).or_default());
        let mut guard = slot.lock();

        match guard.as_ref() {
            Some(entry) if entry.is_fresh(ttl) => {
                self.increment_stat("hits");
                debug!("Candidate cache hit for '{}'", key);
                return Ok(Arc::clone(&entry.candidates));
            }
            Some(_) => {
                self.increment_stat("expirations");
                debug!("Candidate cache entry for '{}' expired", key);
            }
            None => {
                self.increment_stat("misses");
                debug!("Candidate cache miss for '{}'", key);
            }
        }

        match fetcher() {
            Ok(candidates) => {
                debug!("Fetched {} candidate(s) for '{}'", candidates.len(), key);
                let entry = CacheEntry::new(candidates);
                let candidates = Arc::clone(&entry.candidates);
                *guard = Some(entry);
                Ok(candidates)
            }
            Err(err) => {
                self.increment_stat("fetch_failures");
                warn!("Candidate fetch for '{}' failed", key);
                Err(err)
            }
        }
    }

    /// Drops the entry for `key`
    ///
    /// Returns `true` if an entry was present.
    pub fn invalidate(&self, key: &str) -> bool {
        self.slots
            .remove(key)
            .map(|(_, slot)| slot.lock().is_some())
            .unwrap_or(false)
    }

    /// Drops every entry and resets statistics
    pub fn clear(&self) {
        self.slots.clear();
        self.stats.clear();
    }

    /// Number of stored entries, fresh or stale
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.value().lock().is_some()).count()
    }

    /// Returns true if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.get_stat("hits"),
            misses: self.get_stat("misses"),
            expirations: self.get_stat("expirations"),
            fetch_failures: self.get_stat("fetch_failures"),
            entries: self.len(),
        }
    }

    fn increment_stat(&self, key: &'static str) {
        self.stats
            .entry(key)
            .and_modify(|count| *count += 1)
            .or_insert(1);
    }

    fn get_stat(&self, key: &'static str) -> usize {
        self.stats.get(key).map(|v| *v).unwrap_or(0)
    }
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub expirations: usize,
    pub fetch_failures: usize,
    pub entries: usize,
}

impl CacheStats {
    /// Calculate cache hit rate
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses + self.expirations;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
