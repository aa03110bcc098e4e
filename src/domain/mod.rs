//! Usage: Domain models and pure computations (filters, logs, aggregation, export).

pub mod analytics;
pub mod export;
pub mod filter;
pub mod request_log;
