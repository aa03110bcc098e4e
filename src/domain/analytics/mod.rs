//! Usage: Pure aggregation from request logs to chart series, stats, and breakdowns.

mod breakdown;
mod chart;
mod stats;

pub use breakdown::{model_usage, provider_usage, ModelUsage, ProviderUsage, BREAKDOWN_LIMIT};
pub use chart::{chart_series, ChartDataPoint, CHART_BUCKET_LIMIT};
pub use stats::{summary_stats, Stats};

use serde::Serialize;

use crate::domain::request_log::RequestLog;

/// Everything derived from one successful full-dataset fetch. Ephemeral:
/// recomputed per fetch, reset to defaults on a full-fetch error, never
/// persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregates {
    pub chart: Vec<ChartDataPoint>,
    pub stats: Stats,
    pub model_usage: Vec<ModelUsage>,
    pub provider_usage: Vec<ProviderUsage>,
}

pub fn aggregate(rows: &[RequestLog]) -> Aggregates {
    Aggregates {
        chart: chart_series(rows),
        stats: summary_stats(rows),
        model_usage: model_usage(rows),
        provider_usage: provider_usage(rows),
    }
}
