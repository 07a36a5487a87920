//! HTTP row source for the Google Sheets values API.

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::config::SheetsConfig;
use crate::error::{SheetError, SheetResult};
use crate::traits::{RawRow, RowSource};

/// Body of a `GET .../values/{range}` response. `values` is omitted for an empty range.
#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Reads the configured range with one GET per call, no retries.
#[derive(Debug, Clone)]
pub struct SheetsFetcher {
    client: reqwest::Client,
    url: Url,
    api_key: String,
    spreadsheet_id: String,
}

impl SheetsFetcher {
    /// Builds the fetcher and its HTTP client from the configuration
    pub fn new(config: &SheetsConfig) -> SheetResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SheetError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: values_url(&config.base_url, &config.spreadsheet_id, &config.range)?,
            api_key: config.api_key.clone(),
            spreadsheet_id: config.spreadsheet_id.clone(),
        })
    }
}

#[async_trait]
impl RowSource for SheetsFetcher {
    async fn fetch_rows(&self) -> SheetResult<Vec<RawRow>> {
        let response = self
            .client
            .get(self.url.clone())
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        debug!(status = %status, sheet = %self.spreadsheet_id, "sheet response received");

        if !status.is_success() {
            let err = SheetError::from_status(status.as_u16());
            error!("Sheet fetch for '{}' failed: {}", self.spreadsheet_id, err);
            return Err(err);
        }

        let body = response
            .text()
            .await
            .map_err(|e| SheetError::UpstreamTransport(format!("failed to read body: {e}")))?;
        let range: ValueRange = serde_json::from_str(&body)
            .map_err(|e| SheetError::UpstreamMalformed(e.to_string()))?;

        Ok(range
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    fn source_name(&self) -> &str {
        &self.spreadsheet_id
    }
}

/// `{base}/{id}/values/{range}` with the id and range encoded as single path segments.
fn values_url(base_url: &str, spreadsheet_id: &str, range: &str) -> SheetResult<Url> {
    let mut url = Url::parse(base_url)
        .map_err(|e| SheetError::Config(format!("invalid base URL {base_url:?}: {e}")))?;
    url.path_segments_mut()
        .map_err(|_| SheetError::Config(format!("base URL {base_url:?} cannot carry a path")))?
        .pop_if_empty()
        .extend([spreadsheet_id, "values", range]);
    Ok(url)
}

fn classify_transport_error(err: reqwest::Error) -> SheetError {
    if err.is_connect() || err.is_timeout() {
        SheetError::UpstreamUnreachable(err.to_string())
    } else if let Some(status) = err.status() {
        SheetError::from_status(status.as_u16())
    } else {
        SheetError::UpstreamTransport(err.to_string())
    }
}

fn cell_to_string(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
