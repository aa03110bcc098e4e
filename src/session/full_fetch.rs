//! Usage: Batched retrieval of the complete filtered dataset for aggregation.

use chrono::Utc;
use tracing::debug;

use crate::domain::filter::FilterSpec;
use crate::domain::request_log::RequestLog;
use crate::error::FetchError;
use crate::infra::log_store::{LogStore, StoreQuery};

/// Upper bound on rows a single store query may return.
pub const STORE_ROW_CAP: usize = 100_000;

/// Fetches every row matching a filter, batching past the per-query row cap
/// so aggregates always cover the complete dataset.
pub struct FullDatasetFetcher {
    row_cap: usize,
}

impl Default for FullDatasetFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl FullDatasetFetcher {
    pub fn new() -> Self {
        Self::with_row_cap(STORE_ROW_CAP)
    }

    /// Tests scale the cap down to exercise batching without bulk data.
    pub fn with_row_cap(row_cap: usize) -> Self {
        Self { row_cap }
    }

    /// The time anchor is captured once so every batch of one fetch sees the
    /// same relative-range bound. Any failed batch aborts the whole fetch.
    pub async fn fetch<S: LogStore>(
        &self,
        store: &S,
        filter: &FilterSpec,
    ) -> Result<Vec<RequestLog>, FetchError> {
        let now = Utc::now();
        let first = store
            .query(StoreQuery::from_filter(filter, now, self.row_cap, 0))
            .await?;
        let total = first.total_count as usize;
        let mut rows = first.rows;
        if total <= rows.len() {
            return Ok(rows);
        }

        rows.reserve(total - rows.len());
        while rows.len() < total {
            let offset = rows.len();
            let batch_size = self.row_cap.min(total - offset);
            let batch = store
                .query(StoreQuery::from_filter(filter, now, batch_size, offset))
                .await?;
            if batch.rows.is_empty() {
                // The store shrank under us; stop rather than loop forever.
                debug!(offset, total, "empty batch before reported total");
                break;
            }
            rows.extend(batch.rows);
        }
        Ok(rows)
    }
}
