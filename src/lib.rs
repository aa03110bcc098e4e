//! Usage: Usage analytics engine for the LLM gateway dashboard.
//!
//! Reads request logs from a capped log store, aggregates the complete
//! filtered dataset for the usage chart and stats cards, pages the log list
//! with load-more, and exports the visible rows as CSV.

pub mod domain;
pub mod error;
pub mod infra;
pub mod logging;
pub mod session;

pub use domain::analytics::{
    aggregate, Aggregates, ChartDataPoint, ModelUsage, ProviderUsage, Stats, BREAKDOWN_LIMIT,
    CHART_BUCKET_LIMIT,
};
pub use domain::export::export_csv;
pub use domain::filter::{FilterSpec, StatusFilter, TimeRange, DEFAULT_PAGE_SIZE};
pub use domain::request_log::{RequestLog, RotationAttempt};
pub use error::{ExportError, FetchError, FilterParseError, StoreQueryError};
pub use infra::db::Db;
pub use infra::log_store::{LogStore, QueryPage, SqliteLogStore, StoreQuery};
pub use session::{
    AnalyticsSession, AnalyticsSnapshot, FullDatasetFetcher, SessionPhase, WindowPage,
    WindowedFetcher, STORE_ROW_CAP,
};
