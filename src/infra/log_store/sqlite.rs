//! Usage: SQLite-backed log store adapter over the pooled connection.

use chrono::TimeZone;
use chrono::Utc;
use rusqlite::{params, Connection};

use crate::domain::filter::StatusFilter;
use crate::domain::request_log::{parse_rotation_log, RequestLog};
use crate::error::StoreQueryError;
use crate::infra::db::Db;

use super::{LogStore, QueryPage, StoreQuery};

const REQUEST_LOG_FIELDS: &str = "
  log_id,
  time_stamp_ms,
  provider,
  model,
  key_name,
  status,
  input_tokens,
  output_tokens,
  total_tokens,
  response_time_ms,
  estimated_cost,
  latency_ms,
  tokens_per_second,
  is_fallback,
  is_cache_hit,
  key_rotation_json,
  request_payload,
  response_payload
";

const LOG_FILTER_WHERE: &str = "
  (?1 IS NULL OR time_stamp_ms >= ?1)
  AND (?2 IS NULL OR status >= ?2)
  AND (?3 IS NULL OR status < ?3)
  AND (?4 IS NULL
    OR LOWER(COALESCE(provider, '')) LIKE '%' || ?4 || '%'
    OR LOWER(COALESCE(model, '')) LIKE '%' || ?4 || '%'
    OR LOWER(COALESCE(key_name, '')) LIKE '%' || ?4 || '%')
";

#[derive(Clone)]
pub struct SqliteLogStore {
    db: Db,
}

impl SqliteLogStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Synchronous insert used by the gateway's log writer.
    pub fn insert_logs(&self, rows: &[RequestLog]) -> Result<(), StoreQueryError> {
        let conn = self.db.open_connection()?;
        insert_into(&conn, rows)
    }
}

impl LogStore for SqliteLogStore {
    async fn query(&self, query: StoreQuery) -> Result<QueryPage, StoreQueryError> {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || {
            let conn = db.open_connection()?;
            query_page(&conn, &query)
        })
        .await
        .map_err(|e| StoreQueryError::Task(e.to_string()))?
    }
}

/// Status bounds as a half-open `[lo, hi)` range. `error` is open-ended.
fn status_bounds(filter: StatusFilter) -> (Option<i64>, Option<i64>) {
    match filter {
        StatusFilter::All => (None, None),
        StatusFilter::Success => (Some(200), Some(300)),
        StatusFilter::Error => (Some(400), None),
    }
}

fn query_page(conn: &Connection, query: &StoreQuery) -> Result<QueryPage, StoreQueryError> {
    let lower_bound_ms = query.lower_bound.map(|ts| ts.timestamp_millis());
    let (status_lo, status_hi) = status_bounds(query.status_filter);
    let search = query.search_query.as_deref().map(str::to_lowercase);

    let sql = format!(
        "SELECT{REQUEST_LOG_FIELDS}FROM request_logs WHERE{LOG_FILTER_WHERE}\
         ORDER BY time_stamp_ms DESC, id DESC LIMIT ?5 OFFSET ?6"
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| StoreQueryError::query("failed to prepare query", e))?;
    let mapped = stmt
        .query_map(
            params![
                lower_bound_ms,
                status_lo,
                status_hi,
                search,
                query.limit as i64,
                query.offset as i64
            ],
            row_to_log,
        )
        .map_err(|e| StoreQueryError::query("failed to list request_logs", e))?;

    let mut rows = Vec::new();
    for row in mapped {
        rows.push(row.map_err(|e| StoreQueryError::query("failed to read request_log row", e))?);
    }

    let count_sql = format!("SELECT COUNT(*) FROM request_logs WHERE{LOG_FILTER_WHERE}");
    let total_count: i64 = conn
        .query_row(
            &count_sql,
            params![lower_bound_ms, status_lo, status_hi, search],
            |row| row.get(0),
        )
        .map_err(|e| StoreQueryError::query("failed to count request_logs", e))?;

    Ok(QueryPage {
        rows,
        total_count: total_count.max(0) as u64,
    })
}

fn row_to_log(row: &rusqlite::Row<'_>) -> Result<RequestLog, rusqlite::Error> {
    let time_stamp_ms: Option<i64> = row.get("time_stamp_ms")?;
    let key_rotation_json: String = row.get("key_rotation_json")?;
    let request_payload: Option<String> = row.get("request_payload")?;
    let response_payload: Option<String> = row.get("response_payload")?;

    Ok(RequestLog {
        log_id: row.get("log_id")?,
        timestamp: time_stamp_ms.and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        provider: row.get("provider")?,
        model: row.get("model")?,
        key_name: row.get("key_name")?,
        status: row.get("status")?,
        input_tokens: row.get("input_tokens")?,
        output_tokens: row.get("output_tokens")?,
        total_tokens: row.get("total_tokens")?,
        response_time_ms: row.get("response_time_ms")?,
        estimated_cost: row.get("estimated_cost")?,
        latency_ms: row.get("latency_ms")?,
        tokens_per_second: row.get("tokens_per_second")?,
        is_fallback: row.get("is_fallback")?,
        is_cache_hit: row.get("is_cache_hit")?,
        key_rotation_log: parse_rotation_log(&key_rotation_json),
        request_payload: request_payload.and_then(|json| serde_json::from_str(&json).ok()),
        response_payload: response_payload.and_then(|json| serde_json::from_str(&json).ok()),
    })
}

fn insert_into(conn: &Connection, rows: &[RequestLog]) -> Result<(), StoreQueryError> {
    let mut stmt = conn
        .prepare(
            "INSERT INTO request_logs (
               log_id, time_stamp_ms, provider, model, key_name, status,
               input_tokens, output_tokens, total_tokens, response_time_ms,
               estimated_cost, latency_ms, tokens_per_second,
               is_fallback, is_cache_hit, key_rotation_json,
               request_payload, response_payload
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
        )
        .map_err(|e| StoreQueryError::query("failed to prepare insert", e))?;

    for log in rows {
        let rotation_json = serde_json::to_string(&log.key_rotation_log)
            .map_err(|e| StoreQueryError::query("failed to encode rotation log", e))?;
        stmt.execute(params![
            log.log_id,
            log.timestamp.map(|ts| ts.timestamp_millis()),
            log.provider,
            log.model,
            log.key_name,
            log.status,
            log.input_tokens,
            log.output_tokens,
            log.total_tokens,
            log.response_time_ms,
            log.estimated_cost,
            log.latency_ms,
            log.tokens_per_second,
            log.is_fallback,
            log.is_cache_hit,
            rotation_json,
            log.request_payload
                .as_ref()
                .map(serde_json::Value::to_string),
            log.response_payload
                .as_ref()
                .map(serde_json::Value::to_string),
        ])
        .map_err(|e| StoreQueryError::query("failed to insert request_log", e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::infra::db::migrations::apply_migrations;

    fn test_conn() -> Connection {
        let mut conn = Connection::open_in_memory().expect("open in-memory sqlite");
        apply_migrations(&mut conn).expect("apply migrations");
        conn
    }

    fn seed(conn: &Connection) {
        let base = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let rows = vec![
            RequestLog {
                log_id: "log-1".to_string(),
                timestamp: Some(base),
                provider: Some("OpenAI".to_string()),
                model: Some("gpt-4o".to_string()),
                key_name: Some("primary".to_string()),
                status: Some(200),
                estimated_cost: Some(0.02),
                ..Default::default()
            },
            RequestLog {
                log_id: "log-2".to_string(),
                timestamp: Some(base - Duration::hours(1)),
                provider: Some("anthropic".to_string()),
                model: Some("claude-sonnet".to_string()),
                status: Some(500),
                ..Default::default()
            },
            RequestLog {
                log_id: "log-3".to_string(),
                timestamp: Some(base - Duration::days(10)),
                provider: Some("openai".to_string()),
                model: Some("gpt-3.5-turbo".to_string()),
                status: Some(204),
                ..Default::default()
            },
        ];
        insert_into(conn, &rows).expect("seed rows");
    }

    fn all_rows_query() -> StoreQuery {
        StoreQuery {
            lower_bound: None,
            status_filter: StatusFilter::All,
            search_query: None,
            limit: 100,
            offset: 0,
        }
    }

    #[test]
    fn lists_newest_first_with_full_count() {
        let conn = test_conn();
        seed(&conn);

        let page = query_page(&conn, &all_rows_query()).unwrap();
        assert_eq!(page.total_count, 3);
        let ids: Vec<&str> = page.rows.iter().map(|r| r.log_id.as_str()).collect();
        assert_eq!(ids, ["log-1", "log-2", "log-3"]);
    }

    #[test]
    fn time_lower_bound_is_inclusive() {
        let conn = test_conn();
        seed(&conn);

        let bound = Utc.with_ymd_and_hms(2024, 3, 15, 11, 0, 0).unwrap();
        let page = query_page(
            &conn,
            &StoreQuery {
                lower_bound: Some(bound),
                ..all_rows_query()
            },
        )
        .unwrap();
        assert_eq!(page.total_count, 2);
        assert_eq!(page.rows[1].log_id, "log-2");
    }

    #[test]
    fn status_filter_selects_ranges() {
        let conn = test_conn();
        seed(&conn);

        let success = query_page(
            &conn,
            &StoreQuery {
                status_filter: StatusFilter::Success,
                ..all_rows_query()
            },
        )
        .unwrap();
        assert_eq!(success.total_count, 2);
        assert!(success.rows.iter().all(|r| r.is_success()));

        let errors = query_page(
            &conn,
            &StoreQuery {
                status_filter: StatusFilter::Error,
                ..all_rows_query()
            },
        )
        .unwrap();
        assert_eq!(errors.total_count, 1);
        assert_eq!(errors.rows[0].log_id, "log-2");
    }

    #[test]
    fn search_matches_provider_model_and_key_name_case_insensitively() {
        let conn = test_conn();
        seed(&conn);

        let by_provider = query_page(
            &conn,
            &StoreQuery {
                search_query: Some("OPENAI".to_string()),
                ..all_rows_query()
            },
        )
        .unwrap();
        assert_eq!(by_provider.total_count, 2);

        let by_model = query_page(
            &conn,
            &StoreQuery {
                search_query: Some("sonnet".to_string()),
                ..all_rows_query()
            },
        )
        .unwrap();
        assert_eq!(by_model.total_count, 1);
        assert_eq!(by_model.rows[0].log_id, "log-2");

        let by_key = query_page(
            &conn,
            &StoreQuery {
                search_query: Some("primary".to_string()),
                ..all_rows_query()
            },
        )
        .unwrap();
        assert_eq!(by_key.total_count, 1);
        assert_eq!(by_key.rows[0].log_id, "log-1");
    }

    #[test]
    fn limit_and_offset_page_through_while_count_stays_full() {
        let conn = test_conn();
        seed(&conn);

        let page = query_page(
            &conn,
            &StoreQuery {
                limit: 2,
                offset: 2,
                ..all_rows_query()
            },
        )
        .unwrap();
        assert_eq!(page.total_count, 3);
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0].log_id, "log-3");
    }

    #[test]
    fn round_trips_payloads_and_rotation_log() {
        let conn = test_conn();
        let log = RequestLog {
            log_id: "log-full".to_string(),
            timestamp: Some(Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()),
            is_fallback: true,
            key_rotation_log: parse_rotation_log(
                r#"[{"key":"k1","outcome":"error"},{"key":"k2","outcome":"success"}]"#,
            ),
            request_payload: Some(serde_json::json!({"model": "gpt-4o"})),
            ..Default::default()
        };
        insert_into(&conn, std::slice::from_ref(&log)).unwrap();

        let page = query_page(&conn, &all_rows_query()).unwrap();
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0], log);
    }

    #[tokio::test]
    async fn pooled_store_queries_through_spawn_blocking() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db = Db::open(dir.path().join("analytics.db")).expect("open db");
        let store = SqliteLogStore::new(db);

        store
            .insert_logs(&[RequestLog {
                log_id: "log-1".to_string(),
                timestamp: Some(Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()),
                status: Some(200),
                ..Default::default()
            }])
            .expect("insert");

        let page = store.query(all_rows_query()).await.expect("query");
        assert_eq!(page.total_count, 1);
        assert_eq!(page.rows[0].log_id, "log-1");
    }
}
