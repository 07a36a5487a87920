use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::record::Record;

/// Default time-to-live for a cached snapshot.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// The full dataset as held by the cache. Shared, never mutated in place.
pub type Snapshot = Arc<Vec<Record>>;

/// Statistics for cache operations
#[derive(Debug, Default)]
pub struct CacheStatistics {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    clears: AtomicU64,
}

impl CacheStatistics {
    /// Get the number of fresh lookups
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Get the number of lookups that found nothing fresh
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Get the number of snapshot replacements
    pub fn writes(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Get the number of explicit clears
    pub fn clears(&self) -> u64 {
        self.clears.load(Ordering::Relaxed)
    }

    /// Calculate the cache hit rate (hits / (hits + misses))
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    /// Copies the counters into a serializable value
    pub fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits(),
            misses: self.misses(),
            writes: self.writes(),
            clears: self.clears(),
            hit_rate: self.hit_rate(),
        }
    }

    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    fn record_clear(&self) {
        self.clears.fetch_add(1, Ordering::Relaxed);
    }
}

/// Point-in-time copy of [`CacheStatistics`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub clears: u64,
    pub hit_rate: f64,
}

/// A held snapshot together with the time it was fetched
#[derive(Debug, Clone)]
pub struct CacheEntry {
    records: Snapshot,
    fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    fn new(records: Vec<Record>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            records: Arc::new(records),
            fetched_at,
        }
    }

    /// The cached records
    pub fn records(&self) -> &Snapshot {
        &self.records
    }

    /// When the records were fetched from upstream
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    fn age(&self, now: DateTime<Utc>) -> Duration {
        // A timestamp in the future counts as age zero.
        now.signed_duration_since(self.fetched_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

/// Result of inspecting the cache against its TTL
#[derive(Debug, Clone)]
pub enum CacheLookup {
    /// Present and within TTL
    Fresh(Arc<CacheEntry>),
    /// Present but older than TTL
    Stale(Arc<CacheEntry>),
    /// Nothing held
    Empty,
}

/// Configuration for SnapshotCache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for the held snapshot
    pub ttl: Duration,
}

impl CacheConfig {
    /// Create a new cache configuration with the default TTL
    pub fn new() -> Self {
        Self {
            ttl: DEFAULT_CACHE_TTL,
        }
    }

    /// Set the TTL for the cached snapshot
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Observability view of the cache
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheInfo {
    /// A snapshot is resident, fresh or not
    pub present: bool,
    /// A snapshot is resident and within TTL
    pub fresh: bool,
    pub last_updated: Option<DateTime<Utc>>,
    /// Seconds until the snapshot expires; zero once stale, absent when empty
    pub ttl_remaining: Option<u64>,
    pub record_count: usize,
    pub stats: CacheStats,
}

/// Single-slot TTL cache for the full dataset.
///
/// Expired snapshots stay resident until replaced or cleared so they can be
/// served through [`get_stale`](Self::get_stale) when upstream is down.
/// Writers swap the whole entry under the lock; readers clone the `Arc` and
/// never observe a partially written snapshot.
#[derive(Debug)]
pub struct SnapshotCache {
    entry: RwLock<Option<Arc<CacheEntry>>>,
    config: CacheConfig,
    statistics: CacheStatistics,
}

impl SnapshotCache {
    /// Creates a new empty cache with the given configuration
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entry: RwLock::new(None),
            config,
            statistics: CacheStatistics::default(),
        }
    }

    /// Classifies the held snapshot as fresh, stale or empty
    pub fn lookup(&self) -> CacheLookup {
        let state = self.peek();
        match state {
            CacheLookup::Fresh(_) => self.statistics.record_hit(),
            CacheLookup::Stale(_) | CacheLookup::Empty => self.statistics.record_miss(),
        }
        state
    }

    /// Same as [`lookup`](Self::lookup) without touching hit/miss counters
    pub fn peek(&self) -> CacheLookup {
        let entry = self.entry.read().clone();
        match entry {
            Some(entry) if entry.age(Utc::now()) <= self.config.ttl => CacheLookup::Fresh(entry),
            Some(entry) => CacheLookup::Stale(entry),
            None => CacheLookup::Empty,
        }
    }

    /// Gets the snapshot only if it is within TTL
    pub fn get(&self) -> Option<Arc<CacheEntry>> {
        match self.lookup() {
            CacheLookup::Fresh(entry) => Some(entry),
            CacheLookup::Stale(_) | CacheLookup::Empty => None,
        }
    }

    /// Gets the snapshot regardless of TTL
    pub fn get_stale(&self) -> Option<Arc<CacheEntry>> {
        self.entry.read().clone()
    }

    /// Replaces the held snapshot and its fetch time
    pub fn set(&self, records: Vec<Record>, fetched_at: DateTime<Utc>) -> Arc<CacheEntry> {
        let entry = Arc::new(CacheEntry::new(records, fetched_at));
        *self.entry.write() = Some(Arc::clone(&entry));
        self.statistics.record_write();
        tracing::debug!(
            records = entry.records.len(),
            fetched_at = %fetched_at.to_rfc3339(),
            "SnapshotCache: stored snapshot"
        );
        entry
    }

    /// Drops the held snapshot entirely, stale fallback included
    pub fn clear(&self) {
        *self.entry.write() = None;
        self.statistics.record_clear();
        tracing::info!("SnapshotCache: cache cleared");
    }

    /// Reports cache state without touching hit/miss counters
    pub fn info(&self) -> CacheInfo {
        let now = Utc::now();
        let entry = self.entry.read().clone();
        match entry {
            Some(entry) => {
                let age = entry.age(now);
                let remaining = self.config.ttl.saturating_sub(age);
                CacheInfo {
                    present: true,
                    fresh: age <= self.config.ttl,
                    last_updated: Some(entry.fetched_at),
                    ttl_remaining: Some(remaining.as_secs()),
                    record_count: entry.records.len(),
                    stats: self.statistics.snapshot(),
                }
            }
            None => CacheInfo {
                present: false,
                fresh: false,
                last_updated: None,
                ttl_remaining: None,
                record_count: 0,
                stats: self.statistics.snapshot(),
            },
        }
    }

    /// Gets the cache statistics
    pub fn statistics(&self) -> &CacheStatistics {
        &self.statistics
    }

    /// Gets the cache configuration
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
