use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::config::PageSizeBounds;
use crate::error::{SheetError, SheetResult};
use crate::record::{Field, Record};
use crate::traits::Searchable;

/// Which fields a query is matched against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchField {
    #[default]
    All,
    Only(Field),
}

impl SearchField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchField::All => "all",
            SearchField::Only(field) => field.as_str(),
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchField {
    type Err = SheetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(SearchField::All)
        } else {
            s.parse().map(SearchField::Only)
        }
    }
}

impl Serialize for SearchField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single search request: text, field selector and the page to return
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub text: String,
    pub field: SearchField,
    /// 1-based
    pub page: usize,
    pub page_size: usize,
}

impl Query {
    pub fn new(text: impl Into<String>, field: SearchField, page: usize, page_size: usize) -> Self {
        Self {
            text: text.into(),
            field,
            page,
            page_size,
        }
    }

    /// First page of `text` across all fields, at the default page size
    pub fn all(text: impl Into<String>, bounds: &PageSizeBounds) -> Self {
        Self::new(text, SearchField::All, 1, bounds.default)
    }

    /// Checks page and page size against the configured bounds
    pub fn validate(&self, bounds: &PageSizeBounds) -> SheetResult<()> {
        if self.page < 1 {
            return Err(SheetError::InvalidQuery(
                "page must be a positive integer".to_string(),
            ));
        }
        if !bounds.contains(self.page_size) {
            return Err(SheetError::InvalidQuery(format!(
                "page size must be between {} and {}",
                bounds.min, bounds.max
            )));
        }
        Ok(())
    }

    /// Lower-cased, trimmed needle; `None` when every record matches
    fn needle(&self) -> Option<String> {
        let trimmed = self.text.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_results: usize,
    pub results_per_page: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInfo {
    /// The query text as the caller sent it
    pub query: String,
    pub field: SearchField,
    pub results_found: usize,
}

/// One page of matches with pagination and search metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T = Record> {
    pub data: Vec<T>,
    pub pagination: Pagination,
    pub search_info: SearchInfo,
}

/// Case-insensitive containment of an already lower-cased, non-empty needle.
fn contains_needle(value: &str, needle: &str) -> bool {
    if value.is_ascii() && needle.is_ascii() {
        value
            .as_bytes()
            .windows(needle.len())
            .any(|window| window.eq_ignore_ascii_case(needle.as_bytes()))
    } else {
        value.to_lowercase().contains(needle)
    }
}

fn is_match<T: Searchable>(item: &T, field: SearchField, needle: &str) -> bool {
    match field {
        SearchField::All => Field::COLUMNS
            .iter()
            .any(|column| contains_needle(item.field_value(*column), needle)),
        SearchField::Only(field) => contains_needle(item.field_value(field), needle),
    }
}

/// Filters `dataset` by the query and returns the requested page.
///
/// Matches keep dataset order. A page past the last one is empty rather than
/// an error. The dataset is only borrowed; returned records are copies.
pub fn search<T: Searchable + Clone>(dataset: &[T], query: &Query) -> SheetResult<PageResult<T>> {
    if query.page < 1 || query.page_size < 1 {
        return Err(SheetError::InvalidQuery(
            "page and page size must be positive".to_string(),
        ));
    }

    let matched: Vec<&T> = match query.needle() {
        None => dataset.iter().collect(),
        Some(needle) => dataset
            .iter()
            .filter(|item| is_match(*item, query.field, &needle))
            .collect(),
    };

    let total_results = matched.len();
    let total_pages = total_results.div_ceil(query.page_size);
    let start = (query.page - 1).checked_mul(query.page_size).ok_or_else(|| {
        SheetError::SearchFailure(format!(
            "page {} of size {} is out of range",
            query.page, query.page_size
        ))
    })?;

    let data = if start >= total_results {
        Vec::new()
    } else {
        let end = start.saturating_add(query.page_size).min(total_results);
        matched[start..end].iter().map(|item| (*item).clone()).collect()
    };

    Ok(PageResult {
        data,
        pagination: Pagination {
            current_page: query.page,
            total_pages,
            total_results,
            results_per_page: query.page_size,
            has_next_page: query.page < total_pages,
            has_prev_page: query.page > 1,
        },
        search_info: SearchInfo {
            query: query.text.clone(),
            field: query.field,
            results_found: total_results,
        },
    })
}
