//! Usage: Request log row model consumed from the gateway's log store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One credential attempt recorded by the gateway's key-rotation loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationAttempt {
    pub key: String,
    pub outcome: String,
}

/// One upstream provider call made through the gateway. Produced externally;
/// rows are immutable once created and this crate never mutates them.
///
/// A row with no timestamp is excluded from time-bucketed charting but still
/// counts toward aggregate totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestLog {
    pub log_id: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub status: Option<i64>,
    pub input_tokens: Option<i64>,
    pub output_tokens: Option<i64>,
    pub total_tokens: Option<i64>,
    pub estimated_cost: Option<f64>,
    pub response_time_ms: Option<i64>,
    pub latency_ms: Option<f64>,
    pub tokens_per_second: Option<f64>,
    pub key_name: Option<String>,
    pub is_fallback: bool,
    pub key_rotation_log: Vec<RotationAttempt>,
    pub is_cache_hit: bool,
    pub request_payload: Option<serde_json::Value>,
    pub response_payload: Option<serde_json::Value>,
}

impl RequestLog {
    pub fn is_success(&self) -> bool {
        matches!(self.status, Some(s) if (200..300).contains(&s))
    }

    pub fn is_error(&self) -> bool {
        matches!(self.status, Some(s) if s >= 400)
    }

    /// The gateway tried more than one credential for this call.
    pub fn was_rotated(&self) -> bool {
        self.key_rotation_log.len() > 1
    }
}

/// Malformed rotation JSON decodes to an empty sequence, never an error.
pub(crate) fn parse_rotation_log(json: &str) -> Vec<RotationAttempt> {
    serde_json::from_str(json).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_log_decodes_leniently() {
        let attempts = parse_rotation_log(r#"[{"key":"k1","outcome":"error"},{"key":"k2","outcome":"success"}]"#);
        assert_eq!(attempts.len(), 2);
        assert_eq!(attempts[1].key, "k2");

        assert!(parse_rotation_log("not json").is_empty());
        assert!(parse_rotation_log("").is_empty());
    }

    #[test]
    fn status_classification() {
        let mut log = RequestLog {
            status: Some(204),
            ..Default::default()
        };
        assert!(log.is_success());
        assert!(!log.is_error());

        log.status = Some(404);
        assert!(!log.is_success());
        assert!(log.is_error());

        log.status = None;
        assert!(!log.is_success());
        assert!(!log.is_error());
    }
}
