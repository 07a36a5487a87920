//! # Sheet Search Cache
//!
//! This crate serves a searchable, paginated view over a remote spreadsheet
//! without calling the upstream API on every request. Rows are normalized into
//! fixed records, held in a single-slot TTL cache, refreshed on demand or on a
//! timer, and served stale when the upstream fails.
//!
//! ## Key Components
//!
//! - `normalize` / `Record`: Positional rows to named record fields
//! - `SnapshotCache`: TTL cache holding the full dataset snapshot
//! - `SheetsFetcher`: HTTP `RowSource` for the Sheets values API
//! - `SheetDataService`: Cache/refresh decisions with stale fallback
//! - `RefreshHandle`: Cancellable periodic forced refresh
//! - `search`: Case-insensitive substring filter plus pagination

mod error;
mod traits;
mod record;
mod cache;
mod config;
mod fetcher;
mod search;
mod stats;
mod service;
mod refresher;

pub use error::{SheetError, SheetResult};
pub use traits::{RawRow, RowSource, Searchable};
pub use record::{normalize, Field, Record};
pub use cache::{
    CacheConfig, CacheEntry, CacheInfo, CacheLookup, CacheStatistics, CacheStats, Snapshot,
    SnapshotCache, DEFAULT_CACHE_TTL,
};
pub use config::{PageSizeBounds, SheetsConfig, DEFAULT_BASE_URL, DEFAULT_RANGE};
pub use fetcher::SheetsFetcher;
pub use search::{search, PageResult, Pagination, Query, SearchField, SearchInfo};
pub use stats::{DatasetReport, DatasetStatistics};
pub use service::{DatasetMetadata, FetchOutcome, SearchResponse, SheetDataService, STALE_ADVISORY};
pub use refresher::RefreshHandle;
