//! Usage: CSV export of the currently loaded request log rows.

use crate::domain::request_log::RequestLog;
use crate::error::ExportError;

const HEADERS: [&str; 15] = [
    "Timestamp",
    "Model",
    "Provider",
    "Key Name",
    "Status",
    "Response Time(ms)",
    "Latency/TTFT(ms)",
    "Speed(tok/s)",
    "Input Tokens",
    "Output Tokens",
    "Total Tokens",
    "Cost",
    "Fallback(Yes/No)",
    "Rotated(Yes/No)",
    "Error(Yes/No)",
];

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

fn or_na(value: Option<&String>) -> &str {
    value.map(String::as_str).unwrap_or("N/A")
}

/// Serializes rows in their given order. Missing text fields render as
/// `N/A`, missing token and latency numbers as `0`, cost always with four
/// decimals.
pub fn export_csv(rows: &[RequestLog]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADERS)?;

    for row in rows {
        writer.write_record([
            row.timestamp
                .map(|ts| ts.to_rfc3339())
                .unwrap_or_else(|| "N/A".to_string()),
            or_na(row.model.as_ref()).to_string(),
            or_na(row.provider.as_ref()).to_string(),
            or_na(row.key_name.as_ref()).to_string(),
            row.status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            row.response_time_ms
                .map(|ms| ms.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            row.latency_ms
                .map(|ms| (ms.round() as i64).to_string())
                .unwrap_or_else(|| "0".to_string()),
            row.tokens_per_second
                .filter(|v| *v != 0.0)
                .map(|v| format!("{v:.2}"))
                .unwrap_or_else(|| "0".to_string()),
            row.input_tokens.unwrap_or(0).to_string(),
            row.output_tokens.unwrap_or(0).to_string(),
            row.total_tokens
                .map(|t| t.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            format!("{:.4}", row.estimated_cost.unwrap_or(0.0)),
            yes_no(row.is_fallback).to_string(),
            yes_no(row.was_rotated()).to_string(),
            yes_no(row.is_error()).to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Flush(e.to_string()))?;
    Ok(String::from_utf8(bytes)?)
}
