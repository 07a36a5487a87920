use async_trait::async_trait;

use crate::error::SheetResult;
use crate::record::Field;

/// One raw upstream row: positional cell strings, possibly shorter than the header.
pub type RawRow = Vec<String>;

/// A remote source of raw sheet rows.
///
/// Implementations perform exactly one outbound read per call and classify
/// failures into [`SheetError`](crate::SheetError) upstream variants.
/// Retrying and fallback belong to the caller.
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Reads the full row set, header row first.
    async fn fetch_rows(&self) -> SheetResult<Vec<RawRow>>;

    /// A short name for log lines.
    fn source_name(&self) -> &str;
}

/// A trait for models that can be matched by the search engine.
pub trait Searchable {
    /// Returns the value of a single named field.
    fn field_value(&self, field: Field) -> &str;
}
