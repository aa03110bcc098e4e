//! Usage: Error taxonomy for store queries, fetch cycles, and CSV export.

use thiserror::Error;

/// Failure reported by a [`LogStore`](crate::LogStore) implementation.
///
/// Stale-response discards are deliberately absent: a superseded fetch is an
/// internal no-op, never surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreQueryError {
    #[error("DB_ERROR: failed to get connection from pool: {0}")]
    Pool(String),

    #[error("DB_ERROR: {context}: {message}")]
    Query {
        context: &'static str,
        message: String,
    },

    #[error("DB_ERROR: store query task failed: {0}")]
    Task(String),
}

impl StoreQueryError {
    pub(crate) fn query(context: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Query {
            context,
            message: err.to_string(),
        }
    }
}

/// Fetcher-level failure. Timeouts from the underlying store client surface
/// here unchanged; no retry happens at this layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error(transparent)]
    Store(#[from] StoreQueryError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("SEC_INVALID_INPUT: unknown {field}={value}")]
pub struct FilterParseError {
    pub field: &'static str,
    pub value: String,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write csv record: {0}")]
    Write(#[from] csv::Error),

    #[error("failed to flush csv output: {0}")]
    Flush(String),

    #[error("csv output was not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}
