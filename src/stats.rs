use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::CacheInfo;
use crate::record::Record;

/// Summary counts over a dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetStatistics {
    pub total_records: usize,
    /// Distinct customer names, the empty name included
    pub unique_customers: usize,
    pub unique_areas: usize,
    pub unique_brands: usize,
    pub records_with_mobile: usize,
    pub records_with_purchase_date: usize,
}

impl DatasetStatistics {
    pub fn from_records(records: &[Record]) -> Self {
        let unique_customers: HashSet<&str> =
            records.iter().map(|r| r.customer_name.as_str()).collect();

        Self {
            total_records: records.len(),
            unique_customers: unique_customers.len(),
            unique_areas: distinct_non_empty(records.iter().map(|r| r.area.as_str())),
            unique_brands: distinct_non_empty(records.iter().map(|r| r.brand.as_str())),
            records_with_mobile: records.iter().filter(|r| !r.mobile.is_empty()).count(),
            records_with_purchase_date: records
                .iter()
                .filter(|r| !r.purchase_date.is_empty())
                .count(),
        }
    }
}

fn distinct_non_empty<'a>(values: impl Iterator<Item = &'a str>) -> usize {
    values
        .filter(|v| !v.is_empty())
        .collect::<HashSet<_>>()
        .len()
}

/// Dataset statistics together with cache and freshness state
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetReport {
    pub statistics: DatasetStatistics,
    pub cache_info: CacheInfo,
    pub last_updated: DateTime<Utc>,
    pub from_cache: bool,
}
