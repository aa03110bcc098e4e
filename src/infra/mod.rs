//! Usage: Infrastructure adapters (sqlite persistence and the log store client).

pub mod db;
pub mod log_store;
