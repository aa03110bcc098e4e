//! Usage: Windowed page fetch for the log list with a load-more heuristic.

use chrono::Utc;

use crate::domain::filter::FilterSpec;
use crate::domain::request_log::RequestLog;
use crate::error::FetchError;
use crate::infra::log_store::{LogStore, StoreQuery};

/// One visible window of the log list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowPage {
    pub rows: Vec<RequestLog>,
    pub total_count: u64,
    /// A full page suggests more rows exist. A final page whose length
    /// happens to equal the page size yields a false positive; the next
    /// load-more then comes back empty and clears it.
    pub has_more: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WindowedFetcher;

impl WindowedFetcher {
    /// Fetches one page. `known_len` is the number of rows already shown;
    /// when given, the page starts right after them (load-more), otherwise
    /// at the filter's own offset (fresh window).
    pub async fn fetch_page<S: LogStore>(
        &self,
        store: &S,
        filter: &FilterSpec,
        known_len: Option<usize>,
    ) -> Result<WindowPage, FetchError> {
        let limit = filter.page_size();
        let offset = known_len.unwrap_or(filter.offset);
        let page = store
            .query(StoreQuery::from_filter(filter, Utc::now(), limit, offset))
            .await?;
        let has_more = page.rows.len() == limit;
        Ok(WindowPage {
            rows: page.rows,
            total_count: page.total_count,
            has_more,
        })
    }
}
