//! Usage: SQLite migration v0->v1 (request_logs table and indexes).

use chrono::Utc;
use rusqlite::Connection;

use crate::error::StoreQueryError;

pub(super) fn migrate_v0_to_v1(conn: &mut Connection) -> Result<(), StoreQueryError> {
    const VERSION: i64 = 1;
    let tx = conn
        .transaction()
        .map_err(|e| StoreQueryError::query("failed to start sqlite transaction", e))?;

    tx.execute_batch(
        r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
  version INTEGER PRIMARY KEY,
  applied_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS request_logs (
  id INTEGER PRIMARY KEY AUTOINCREMENT,
  log_id TEXT NOT NULL UNIQUE,
  time_stamp_ms INTEGER,
  provider TEXT,
  model TEXT,
  key_name TEXT,
  status INTEGER,
  input_tokens INTEGER,
  output_tokens INTEGER,
  total_tokens INTEGER,
  response_time_ms INTEGER,
  estimated_cost REAL,
  latency_ms REAL,
  tokens_per_second REAL,
  is_fallback INTEGER NOT NULL DEFAULT 0,
  is_cache_hit INTEGER NOT NULL DEFAULT 0,
  key_rotation_json TEXT NOT NULL DEFAULT '[]',
  request_payload TEXT,
  response_payload TEXT
);

CREATE INDEX IF NOT EXISTS idx_request_logs_time_stamp_ms ON request_logs(time_stamp_ms DESC);
CREATE INDEX IF NOT EXISTS idx_request_logs_status ON request_logs(status);
"#,
    )
    .map_err(|e| StoreQueryError::query("failed to migrate v0->v1", e))?;

    let applied_at = Utc::now().timestamp();
    tx.execute(
        "INSERT OR IGNORE INTO schema_migrations(version, applied_at) VALUES (?1, ?2)",
        (VERSION, applied_at),
    )
    .map_err(|e| StoreQueryError::query("failed to record migration", e))?;

    super::set_user_version(&tx, VERSION)?;

    tx.commit()
        .map_err(|e| StoreQueryError::query("failed to commit migration", e))?;

    Ok(())
}
