//! Usage: SQLite schema migrations (user_version + incremental upgrades).

mod v0_to_v1;

use rusqlite::Connection;

use crate::error::StoreQueryError;

const LATEST_SCHEMA_VERSION: i64 = 1;

pub(crate) fn apply_migrations(conn: &mut Connection) -> Result<(), StoreQueryError> {
    let mut user_version = read_user_version(conn)?;

    if !(0..=LATEST_SCHEMA_VERSION).contains(&user_version) {
        return Err(StoreQueryError::Query {
            context: "unsupported sqlite schema version",
            message: format!(
                "user_version={user_version} (expected 0..={LATEST_SCHEMA_VERSION})"
            ),
        });
    }

    while user_version < LATEST_SCHEMA_VERSION {
        match user_version {
            0 => v0_to_v1::migrate_v0_to_v1(conn)?,
            v => {
                return Err(StoreQueryError::Query {
                    context: "unsupported sqlite schema version",
                    message: format!("user_version={v} (expected 0..={LATEST_SCHEMA_VERSION})"),
                })
            }
        }
        user_version = read_user_version(conn)?;
    }

    Ok(())
}

fn read_user_version(conn: &Connection) -> Result<i64, StoreQueryError> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(|e| StoreQueryError::query("failed to read sqlite user_version", e))
}

fn set_user_version(
    tx: &rusqlite::Transaction<'_>,
    version: i64,
) -> Result<(), StoreQueryError> {
    tx.pragma_update(None, "user_version", version)
        .map_err(|e| StoreQueryError::query("failed to update sqlite user_version", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_migrates_to_latest() {
        let mut conn = Connection::open_in_memory().expect("open in-memory sqlite");
        apply_migrations(&mut conn).expect("apply migrations");

        assert_eq!(read_user_version(&conn).unwrap(), LATEST_SCHEMA_VERSION);
        let recorded: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(recorded, LATEST_SCHEMA_VERSION);

        // Re-running is a no-op.
        apply_migrations(&mut conn).expect("apply migrations twice");
    }

    #[test]
    fn future_schema_version_is_rejected() {
        let mut conn = Connection::open_in_memory().expect("open in-memory sqlite");
        conn.pragma_update(None, "user_version", 99).unwrap();
        let err = apply_migrations(&mut conn).unwrap_err();
        assert!(err.to_string().contains("unsupported sqlite schema version"));
    }
}
