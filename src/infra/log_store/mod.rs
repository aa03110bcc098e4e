//! Usage: Log store client boundary (query contract plus the sqlite adapter).

mod sqlite;

pub use sqlite::SqliteLogStore;

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::domain::filter::{FilterSpec, StatusFilter};
use crate::domain::request_log::RequestLog;
use crate::error::StoreQueryError;

/// One page of store results. `total_count` is the count of ALL rows
/// matching the filter, independent of `limit` and `offset`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPage {
    pub rows: Vec<RequestLog>,
    pub total_count: u64,
}

/// A fully resolved store query. Relative time ranges are anchored to a
/// caller-supplied instant so every query of one fetch cycle sees the same
/// bound.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreQuery {
    pub lower_bound: Option<DateTime<Utc>>,
    pub status_filter: StatusFilter,
    pub search_query: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl StoreQuery {
    pub fn from_filter(
        filter: &FilterSpec,
        now: DateTime<Utc>,
        limit: usize,
        offset: usize,
    ) -> Self {
        Self {
            lower_bound: filter.time_range.lower_bound(now),
            status_filter: filter.status_filter,
            search_query: filter.search_term().map(str::to_owned),
            limit,
            offset,
        }
    }
}

/// Read access to the gateway's request log store.
///
/// Implementations must return rows in a stable newest-first order so that
/// offset pagination never skips or duplicates rows between pages of the
/// same unchanged dataset.
pub trait LogStore: Send + Sync {
    fn query(
        &self,
        query: StoreQuery,
    ) -> impl Future<Output = Result<QueryPage, StoreQueryError>> + Send;
}
