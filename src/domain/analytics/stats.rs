//! Usage: Headline stats over the full filtered dataset.

use serde::Serialize;

use crate::domain::request_log::RequestLog;

/// Dashboard headline numbers. An empty dataset yields all zeros.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stats {
    pub total_requests: i64,
    pub success_rate: f64,
    pub avg_response_time_ms: f64,
    pub total_cost: f64,
    pub error_count: i64,
}

pub fn summary_stats(rows: &[RequestLog]) -> Stats {
    if rows.is_empty() {
        return Stats::default();
    }

    let total = rows.len() as i64;
    let mut successes = 0i64;
    let mut errors = 0i64;
    let mut response_time_sum = 0i64;
    let mut cost_sum = 0.0f64;
    for row in rows {
        if row.is_success() {
            successes += 1;
        }
        if row.is_error() {
            errors += 1;
        }
        response_time_sum += row.response_time_ms.unwrap_or(0);
        cost_sum += row.estimated_cost.unwrap_or(0.0);
    }

    Stats {
        total_requests: total,
        success_rate: 100.0 * (successes as f64) / (total as f64),
        avg_response_time_ms: (response_time_sum as f64) / (total as f64),
        total_cost: cost_sum,
        error_count: errors,
    }
}
