//! Usage: Hourly chart series derived from the full filtered dataset.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::request_log::RequestLog;

/// The chart keeps at most this many trailing hour buckets.
pub const CHART_BUCKET_LIMIT: usize = 72;

/// One hour bucket of the usage chart. `bucket` is a UTC hour key of the form
/// `YYYY-MM-DD HH:00`; its lexicographic order is its chronological order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDataPoint {
    pub bucket: String,
    pub request_count: i64,
    pub avg_response_time_ms: i64,
    pub total_cost: f64,
    pub error_count: i64,
}

#[derive(Default)]
struct BucketAccum {
    request_count: i64,
    response_time_sum: i64,
    cost_sum: f64,
    error_count: i64,
}

/// Buckets rows by UTC hour and keeps the most recent
/// [`CHART_BUCKET_LIMIT`] buckets. Only hours that saw traffic appear; gaps
/// are not zero-filled. Rows without a timestamp are skipped.
pub fn chart_series(rows: &[RequestLog]) -> Vec<ChartDataPoint> {
    let mut buckets: BTreeMap<String, BucketAccum> = BTreeMap::new();
    for row in rows {
        let Some(ts) = row.timestamp else {
            continue;
        };
        let key = ts.format("%Y-%m-%d %H:00").to_string();
        let accum = buckets.entry(key).or_default();
        accum.request_count += 1;
        accum.response_time_sum += row.response_time_ms.unwrap_or(0);
        accum.cost_sum += row.estimated_cost.unwrap_or(0.0);
        if row.is_error() {
            accum.error_count += 1;
        }
    }

    let mut series: Vec<ChartDataPoint> = buckets
        .into_iter()
        .map(|(bucket, accum)| ChartDataPoint {
            bucket,
            request_count: accum.request_count,
            avg_response_time_ms: ((accum.response_time_sum as f64)
                / (accum.request_count as f64))
                .round() as i64,
            total_cost: accum.cost_sum,
            error_count: accum.error_count,
        })
        .collect();

    if series.len() > CHART_BUCKET_LIMIT {
        let excess = series.len() - CHART_BUCKET_LIMIT;
        series.drain(..excess);
    }
    series
}
