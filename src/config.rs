use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::error::{SheetError, SheetResult};

/// Public Sheets v4 endpoint.
pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Columns A..L of the first sheet.
pub const DEFAULT_RANGE: &str = "Sheet1!A:L";

/// Period of the unconditional background refresh.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Bounds applied when building a [`Query`](crate::Query)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSizeBounds {
    pub min: usize,
    pub max: usize,
    /// Used when the caller does not ask for a size
    pub default: usize,
}

impl PageSizeBounds {
    pub fn contains(&self, page_size: usize) -> bool {
        (self.min..=self.max).contains(&page_size)
    }
}

impl Default for PageSizeBounds {
    fn default() -> Self {
        Self {
            min: 1,
            max: 50_000,
            default: 50,
        }
    }
}

/// Settings for the upstream fetcher, the cache and the refresh timer
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    pub api_key: String,
    pub range: String,
    pub base_url: String,
    pub request_timeout: Duration,
    pub cache: CacheConfig,
    pub refresh_interval: Duration,
    pub page_size: PageSizeBounds,
}

impl SheetsConfig {
    /// Create a configuration with defaults for everything but the sheet and key
    pub fn new(spreadsheet_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            spreadsheet_id: spreadsheet_id.into(),
            api_key: api_key.into(),
            range: DEFAULT_RANGE.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            cache: CacheConfig::default(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            page_size: PageSizeBounds::default(),
        }
    }

    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = range.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache = self.cache.with_ttl(ttl);
        self
    }

    /// Sets the background refresh period; must be non-zero, see [`Self::validate`]
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn with_page_size(mut self, page_size: PageSizeBounds) -> Self {
        self.page_size = page_size;
        self
    }

    /// Rejects settings the service cannot run with
    pub fn validate(&self) -> SheetResult<()> {
        if self.refresh_interval.is_zero() {
            return Err(SheetError::Config(
                "refresh interval must be greater than zero".to_string(),
            ));
        }
        if self.page_size.min == 0 || self.page_size.min > self.page_size.max {
            return Err(SheetError::Config(format!(
                "page size bounds {}..={} are invalid",
                self.page_size.min, self.page_size.max
            )));
        }
        Ok(())
    }

    /// Loads the configuration from process environment variables
    pub fn from_env() -> SheetResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration through an arbitrary variable lookup
    ///
    /// Recognised keys: `GOOGLE_SHEET_ID`, `GOOGLE_API_KEY` (both required),
    /// `GOOGLE_SHEET_RANGE`, `GOOGLE_SHEETS_BASE_URL`, `CACHE_TTL` (seconds),
    /// `DATA_REFRESH_INTERVAL` (milliseconds), `SHEETS_REQUEST_TIMEOUT`
    /// (seconds) and `SEARCH_MAX_PAGE_SIZE`.
    pub fn from_lookup<F>(lookup: F) -> SheetResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| SheetError::Config(format!("{key} is not set")))
        };

        let mut config = Self::new(required("GOOGLE_SHEET_ID")?, required("GOOGLE_API_KEY")?);

        if let Some(range) = lookup("GOOGLE_SHEET_RANGE") {
            config.range = range;
        }
        if let Some(base_url) = lookup("GOOGLE_SHEETS_BASE_URL") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "CACHE_TTL")? {
            config.cache = config.cache.with_ttl(Duration::from_secs(secs));
        }
        if let Some(millis) = parse_var::<u64, _>(&lookup, "DATA_REFRESH_INTERVAL")? {
            if millis == 0 {
                return Err(SheetError::Config(
                    "DATA_REFRESH_INTERVAL must be greater than zero".to_string(),
                ));
            }
            config.refresh_interval = Duration::from_millis(millis);
        }
        if let Some(secs) = parse_var::<u64, _>(&lookup, "SHEETS_REQUEST_TIMEOUT")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(max) = parse_var::<usize, _>(&lookup, "SEARCH_MAX_PAGE_SIZE")? {
            if max < config.page_size.min {
                return Err(SheetError::Config(format!(
                    "SEARCH_MAX_PAGE_SIZE must be at least {}",
                    config.page_size.min
                )));
            }
            config.page_size.max = max;
            config.page_size.default = config.page_size.default.min(max);
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> SheetResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| SheetError::Config(format!("{key}={raw:?} is invalid: {e}"))),
    }
}
