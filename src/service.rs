use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::cache::{CacheEntry, CacheInfo, CacheLookup, Snapshot, SnapshotCache};
use crate::config::{PageSizeBounds, SheetsConfig};
use crate::error::{SheetError, SheetResult};
use crate::fetcher::SheetsFetcher;
use crate::record::{normalize, Record};
use crate::refresher::RefreshHandle;
use crate::search::{self, PageResult, Query};
use crate::stats::{DatasetReport, DatasetStatistics};
use crate::traits::RowSource;

/// Advisory attached to a result served from an expired snapshot.
pub const STALE_ADVISORY: &str = "served stale after upstream failure";

/// Dataset returned by [`SheetDataService::fetch_data`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchOutcome {
    pub data: Snapshot,
    pub from_cache: bool,
    pub last_updated: DateTime<Utc>,
    /// Set when upstream failed and the last good snapshot was served instead
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FetchOutcome {
    fn cached(entry: &CacheEntry) -> Self {
        Self {
            data: Arc::clone(entry.records()),
            from_cache: true,
            last_updated: entry.fetched_at(),
            error: None,
        }
    }

    fn fetched(entry: &CacheEntry) -> Self {
        Self {
            from_cache: false,
            ..Self::cached(entry)
        }
    }

    /// True when this is last-known-good data served after an upstream failure
    pub fn is_stale_fallback(&self) -> bool {
        self.error.is_some()
    }
}

/// Dataset-level metadata attached to a search response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetMetadata {
    pub from_cache: bool,
    pub last_updated: DateTime<Utc>,
    pub total_records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A page of search results together with where the dataset came from
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(flatten)]
    pub page: PageResult<Record>,
    pub metadata: DatasetMetadata,
}

/// Serves the sheet dataset from a TTL cache, refreshing from upstream when
/// the cache is empty, expired or a refresh is forced.
///
/// Upstream failures fall back to the last snapshot held, however old, and
/// only surface when nothing has been loaded since the last clear. Upstream
/// calls are serialized; the cache itself is shared with the background
/// refresher.
///
/// Non-forced callers that queued behind an upstream attempt reuse its
/// outcome instead of repeating it: a success leaves the cache fresh, and a
/// failure is answered from the stale snapshot (or with the same error).
pub struct SheetDataService {
    source: Arc<dyn RowSource>,
    cache: Arc<SnapshotCache>,
    refresh_lock: Mutex<LastAttempt>,
    /// Completed upstream calls, bumped under `refresh_lock`
    attempts: AtomicU64,
    page_size: PageSizeBounds,
}

/// Result of the most recent upstream call, guarded by the refresh lock
#[derive(Debug, Default)]
struct LastAttempt {
    failure: Option<SheetError>,
}

impl SheetDataService {
    pub fn new(source: Arc<dyn RowSource>, cache: Arc<SnapshotCache>) -> Self {
        Self {
            source,
            cache,
            refresh_lock: Mutex::new(LastAttempt::default()),
            attempts: AtomicU64::new(0),
            page_size: PageSizeBounds::default(),
        }
    }

    /// Builds the HTTP fetcher and cache described by `config`
    pub fn from_config(config: &SheetsConfig) -> SheetResult<Self> {
        config.validate()?;
        let fetcher = SheetsFetcher::new(config)?;
        let cache = SnapshotCache::new(config.cache.clone());
        Ok(Self::new(Arc::new(fetcher), Arc::new(cache)).with_page_size(config.page_size))
    }

    /// Builds the service and arms the periodic refresh.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(config: &SheetsConfig) -> SheetResult<(Arc<Self>, RefreshHandle)> {
        let service = Arc::new(Self::from_config(config)?);
        let handle = Arc::clone(&service).spawn_refresh(config.refresh_interval);
        Ok((service, handle))
    }

    pub fn with_page_size(mut self, page_size: PageSizeBounds) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn page_size(&self) -> &PageSizeBounds {
        &self.page_size
    }

    pub fn cache(&self) -> &Arc<SnapshotCache> {
        &self.cache
    }

    /// Returns the dataset, from cache when fresh and not forced.
    pub async fn fetch_data(&self, force_refresh: bool) -> SheetResult<FetchOutcome> {
        let seen_attempts = self.attempts.load(Ordering::Acquire);
        if !force_refresh {
            if let CacheLookup::Fresh(entry) = self.cache.lookup() {
                debug!(
                    "Returning cached data from '{}', records: {}",
                    self.source.source_name(),
                    entry.records().len()
                );
                return Ok(FetchOutcome::cached(&entry));
            }
        }

        let mut last = self.refresh_lock.lock().await;

        // A caller holding the lock before us may already have gone upstream.
        if !force_refresh {
            if let CacheLookup::Fresh(entry) = self.cache.peek() {
                debug!("Cache refreshed while waiting, skipping upstream call");
                return Ok(FetchOutcome::cached(&entry));
            }
            if self.attempts.load(Ordering::Acquire) != seen_attempts {
                if let Some(err) = last.failure.clone() {
                    debug!("Upstream failed while waiting, skipping upstream call");
                    return self.fall_back(err);
                }
            }
        }

        info!("Fetching fresh data from '{}'", self.source.source_name());
        let result = self.source.fetch_rows().await;
        last.failure = result.as_ref().err().cloned();
        self.attempts.fetch_add(1, Ordering::AcqRel);

        match result {
            Ok(rows) if rows.is_empty() => {
                // Not cached, so a transient empty response does not replace good data.
                warn!("No data found in sheet '{}'", self.source.source_name());
                Ok(FetchOutcome {
                    data: Arc::new(Vec::new()),
                    from_cache: false,
                    last_updated: Utc::now(),
                    error: None,
                })
            }
            Ok(rows) => {
                let entry = self.cache.set(normalize(&rows), Utc::now());
                info!(
                    "Fresh data fetched and cached, records: {}",
                    entry.records().len()
                );
                Ok(FetchOutcome::fetched(&entry))
            }
            Err(err) => {
                error!(
                    "Error fetching data from '{}': {}",
                    self.source.source_name(),
                    err
                );
                self.fall_back(err)
            }
        }
    }

    /// Serves the last snapshot held after `err`, or returns `err` when there is none
    fn fall_back(&self, err: SheetError) -> SheetResult<FetchOutcome> {
        match self.cache.get_stale() {
            Some(entry) => {
                warn!(
                    "Upstream failed, returning cached data as fallback, records: {}",
                    entry.records().len()
                );
                Ok(FetchOutcome {
                    error: Some(format!("{STALE_ADVISORY}: {err}")),
                    ..FetchOutcome::cached(&entry)
                })
            }
            None => Err(err),
        }
    }

    /// Runs a validated query against a borrowed dataset
    pub fn search(&self, data: &[Record], query: &Query) -> SheetResult<PageResult<Record>> {
        query.validate(&self.page_size)?;
        search::search(data, query).inspect_err(|err| {
            if matches!(err, SheetError::SearchFailure(_)) {
                error!("Error during search: {}", err);
            }
        })
    }

    /// Fetches the dataset (honouring the cache) and returns one page of matches
    pub async fn query(&self, query: &Query, force_refresh: bool) -> SheetResult<SearchResponse> {
        query.validate(&self.page_size)?;
        let outcome = self.fetch_data(force_refresh).await?;
        let page = self.search(&outcome.data, query)?;
        Ok(SearchResponse {
            page,
            metadata: DatasetMetadata {
                from_cache: outcome.from_cache,
                last_updated: outcome.last_updated,
                total_records: outcome.data.len(),
                error: outcome.error,
            },
        })
    }

    /// Summary statistics over the current dataset
    pub async fn statistics(&self) -> SheetResult<DatasetReport> {
        let outcome = self.fetch_data(false).await?;
        Ok(DatasetReport {
            statistics: DatasetStatistics::from_records(&outcome.data),
            cache_info: self.cache.info(),
            last_updated: outcome.last_updated,
            from_cache: outcome.from_cache,
        })
    }

    /// Drops the cached snapshot; the next fetch goes upstream
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_info(&self) -> CacheInfo {
        self.cache.info()
    }
}
