/// Error type for sheet fetching, caching and search operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SheetError {
    #[error("Upstream access forbidden. Check API key and permissions.")]
    UpstreamAuth,

    #[error("Invalid upstream request. Check sheet id and range.")]
    UpstreamBadRequest,

    #[error("Sheet not found. Verify sheet id and sharing settings.")]
    UpstreamNotFound,

    #[error("Upstream rate limit exceeded. Please try again later.")]
    UpstreamRateLimited,

    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    #[error("Upstream API error: {0}")]
    UpstreamUnknown(u16),

    #[error("Upstream transport failed: {0}")]
    UpstreamTransport(String),

    #[error("Upstream returned an unreadable body: {0}")]
    UpstreamMalformed(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Search operation failed: {0}")]
    SearchFailure(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SheetError {
    /// Returns true when the error originated from the upstream fetch
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            SheetError::UpstreamAuth
                | SheetError::UpstreamBadRequest
                | SheetError::UpstreamNotFound
                | SheetError::UpstreamRateLimited
                | SheetError::UpstreamUnreachable(_)
                | SheetError::UpstreamUnknown(_)
                | SheetError::UpstreamTransport(_)
                | SheetError::UpstreamMalformed(_)
        )
    }

    /// Maps an upstream HTTP status code into the error taxonomy
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => SheetError::UpstreamAuth,
            400 => SheetError::UpstreamBadRequest,
            404 => SheetError::UpstreamNotFound,
            429 => SheetError::UpstreamRateLimited,
            other => SheetError::UpstreamUnknown(other),
        }
    }
}

/// Result type for sheet operations
pub type SheetResult<T> = Result<T, SheetError>;
