//! Staleness-aware cache decoupling data producers from the render loop.
//!
//! [`FreshnessCache`] is the single piece of state shared between background
//! pollers and the render side. Writers record fetch results or failures per
//! key; readers get the last good value back together with explicit freshness
//! metadata, and never wait on a fetch in progress.
//!
//! # Why DashMap?
//!
//! A single `Mutex<HashMap>` would couple every source's failure domain: a
//! writer updating "weather" would block a reader of "bitcoin". DashMap
//! shards the map so updates only contend within one shard, and a reader of
//! one key is never blocked by a writer of another. No lock is ever held
//! across a fetch; pollers finish their I/O first and only then touch the
//! map, so every critical section is a short read-modify-write of one entry.
//!
//! # Stale-but-available
//!
//! A value, once stored, is never discarded. When a source goes down the
//! cache keeps serving the last good value flagged `is_stale = true`, and the
//! failure is recorded alongside it for status indicators. Screens degrade to
//! old data plus a freshness marker instead of going blank.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;

use crate::source::FetchError;

mod status;

pub use status::{SourceHealth, SourceStatus};

/// A successful read: the last good value plus freshness metadata.
#[derive(Debug, Clone)]
pub struct CachedValue<V> {
    /// The last successfully fetched value.
    pub value: Arc<V>,
    /// Wall-clock time of the successful fetch, for display.
    pub fetched_at: DateTime<Utc>,
    /// Time elapsed since the successful fetch.
    pub age: Duration,
    /// True once `age` exceeds the entry's staleness threshold.
    pub is_stale: bool,
}

/// The most recent failed fetch recorded for a key.
#[derive(Debug, Clone)]
pub struct FetchFailure {
    /// What went wrong, as reported by the source.
    pub error: FetchError,
    /// Wall-clock time of the failure, for display.
    pub at: DateTime<Utc>,
    /// Time elapsed since the failure.
    pub age: Duration,
}

/// Counters for cache read traffic.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Reads that found a value.
    pub hits: u64,
    /// Reads that found no value (unknown key or no successful fetch yet).
    pub misses: u64,
    /// Number of registered entries.
    pub entries: usize,
}

/// A successful fetch: value and both clocks, recorded together.
struct FetchRecord<V> {
    value: Arc<V>,
    at: Instant,
    wall: DateTime<Utc>,
}

/// A failed fetch: error and both clocks, recorded together.
struct FailureRecord {
    error: FetchError,
    at: Instant,
    wall: DateTime<Utc>,
}

/// Per-key cache state.
///
/// `fetched` and `failure` are independent: a failure never clears a value,
/// and a success clears the failure. Both absent means the source is known
/// but has not produced anything yet.
struct CacheEntry<V> {
    fetched: Option<FetchRecord<V>>,
    failure: Option<FailureRecord>,
    stale_after: Duration,
}

impl<V> CacheEntry<V> {
    fn new(stale_after: Duration) -> Self {
        Self {
            fetched: None,
            failure: None,
            stale_after,
        }
    }

    fn snapshot(&self) -> Option<CachedValue<V>> {
        self.fetched.as_ref().map(|fetched| {
            let age = fetched.at.elapsed();
            CachedValue {
                value: Arc::clone(&fetched.value),
                fetched_at: fetched.wall,
                age,
                is_stale: age > self.stale_after,
            }
        })
    }

    fn last_failure(&self) -> Option<FetchFailure> {
        self.failure.as_ref().map(|failure| FetchFailure {
            error: failure.error.clone(),
            at: failure.wall,
            age: failure.at.elapsed(),
        })
    }
}

/// Shared key-value store with per-entry freshness classification.
///
/// One instance serves the whole dashboard: every poller writes its own key,
/// the render loop reads whichever key the active screen needs. Shared via
/// `Arc`; all methods take `&self`.
///
/// Values are stored behind `Arc` so readers clone a pointer, not the
/// payload.
pub struct FreshnessCache<V> {
    entries: DashMap<String, CacheEntry<V>>,
    /// Threshold applied to keys registered without an explicit override.
    default_stale_after: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V> FreshnessCache<V> {
    /// Create a cache whose entries go stale after `default_stale_after`,
    /// unless a key was registered with its own threshold.
    pub fn new(default_stale_after: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_stale_after,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Pre-create an empty entry for `key` with the cache-wide threshold.
    ///
    /// Makes the key show up in [`keys`](Self::keys) and
    /// [`statuses`](Self::statuses) as pending before its first fetch lands.
    pub fn register(&self, key: &str) {
        let stale_after = self.default_stale_after;
        self.register_with(key, stale_after);
    }

    /// Pre-create an empty entry for `key` with its own staleness threshold.
    ///
    /// If the key already exists only the threshold is updated; any stored
    /// value or failure is kept.
    pub fn register_with(&self, key: &str, stale_after: Duration) {
        self.entries
            .entry(key.to_string())
            .or_insert_with(|| CacheEntry::new(stale_after))
            .stale_after = stale_after;
    }

    /// Read the last good value for `key`, if one was ever fetched.
    ///
    /// Never blocks on a fetch. `None` means no successful fetch has
    /// happened yet (or the key is unknown); callers render a "no data yet"
    /// placeholder for that, it is not an error.
    pub fn get(&self, key: &str) -> Option<CachedValue<V>> {
        let snapshot = self.entries.get(key).and_then(|entry| entry.snapshot());
        match snapshot {
            Some(value) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Record a successful fetch: replace the value, stamp both clocks, and
    /// clear any recorded failure.
    pub fn put(&self, key: &str, value: V) {
        let record = FetchRecord {
            value: Arc::new(value),
            at: Instant::now(),
            wall: Utc::now(),
        };
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| CacheEntry::new(self.default_stale_after));
        entry.fetched = Some(record);
        entry.failure = None;
        drop(entry);
        debug!(key, "Cache value updated");
    }

    /// Record a failed fetch without touching the stored value.
    ///
    /// The last good value (and its timestamps) survives so screens keep
    /// something to show; only the failure record is replaced.
    pub fn put_error(&self, key: &str, error: FetchError) {
        let record = FailureRecord {
            error,
            at: Instant::now(),
            wall: Utc::now(),
        };
        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| CacheEntry::new(self.default_stale_after));
        entry.failure = Some(record);
        drop(entry);
        debug!(key, "Cache failure recorded");
    }

    /// The most recent failure recorded for `key`, if any.
    pub fn last_error(&self, key: &str) -> Option<FetchFailure> {
        self.entries.get(key).and_then(|entry| entry.last_failure())
    }

    /// All registered keys, in no particular order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Diagnostic snapshot for one key.
    pub fn status(&self, key: &str) -> Option<SourceStatus> {
        self.entries.get(key).map(|entry| {
            let snapshot = entry.snapshot();
            let last_error = entry.last_failure();
            SourceStatus {
                key: key.to_string(),
                health: SourceHealth::classify(
                    snapshot.is_some(),
                    snapshot.as_ref().is_some_and(|v| v.is_stale),
                    last_error.is_some(),
                ),
                age: snapshot.as_ref().map(|v| v.age),
                fetched_at: snapshot.as_ref().map(|v| v.fetched_at),
                last_error,
            }
        })
    }

    /// Diagnostic snapshots for every registered key, sorted by key for
    /// stable display order.
    pub fn statuses(&self) -> Vec<SourceStatus> {
        // Collect keys first; calling status() under an iter guard would
        // re-lock the same shard.
        let mut statuses: Vec<SourceStatus> = self
            .keys()
            .into_iter()
            .filter_map(|key| self.status(&key))
            .collect();
        statuses.sort_by(|a, b| a.key.cmp(&b.key));
        statuses
    }

    /// Read-traffic counters and entry count.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}
