//! Usage: Top-N model and provider usage breakdowns for the dashboard cards.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::request_log::RequestLog;

/// Breakdowns keep the busiest entries only.
pub const BREAKDOWN_LIMIT: usize = 8;

const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelUsage {
    pub name: String,
    pub requests: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderUsage {
    pub name: String,
    pub requests: i64,
    pub cost: f64,
}

fn label(name: Option<&String>) -> &str {
    match name {
        Some(n) if !n.is_empty() => n,
        _ => UNKNOWN,
    }
}

/// Request counts per model, busiest first, capped at [`BREAKDOWN_LIMIT`].
/// Ties break on name so the ordering is stable across fetches.
pub fn model_usage(rows: &[RequestLog]) -> Vec<ModelUsage> {
    let mut counts: HashMap<&str, i64> = HashMap::new();
    for row in rows {
        *counts.entry(label(row.model.as_ref())).or_default() += 1;
    }

    let mut usage: Vec<ModelUsage> = counts
        .into_iter()
        .map(|(name, requests)| ModelUsage {
            name: name.to_string(),
            requests,
        })
        .collect();
    usage.sort_by(|a, b| b.requests.cmp(&a.requests).then_with(|| a.name.cmp(&b.name)));
    usage.truncate(BREAKDOWN_LIMIT);
    usage
}

/// Request counts and accumulated cost per provider, busiest first, capped
/// at [`BREAKDOWN_LIMIT`].
pub fn provider_usage(rows: &[RequestLog]) -> Vec<ProviderUsage> {
    let mut counts: HashMap<&str, (i64, f64)> = HashMap::new();
    for row in rows {
        let entry = counts.entry(label(row.provider.as_ref())).or_default();
        entry.0 += 1;
        entry.1 += row.estimated_cost.unwrap_or(0.0);
    }

    let mut usage: Vec<ProviderUsage> = counts
        .into_iter()
        .map(|(name, (requests, cost))| ProviderUsage {
            name: name.to_string(),
            requests,
            cost,
        })
        .collect();
    usage.sort_by(|a, b| b.requests.cmp(&a.requests).then_with(|| a.name.cmp(&b.name)));
    usage.truncate(BREAKDOWN_LIMIT);
    usage
}
