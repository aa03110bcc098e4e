//! Usage: SQLite connection setup, schema migrations, and pooled access.

pub(crate) mod migrations;

use std::path::Path;
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::error::StoreQueryError;

const BUSY_TIMEOUT: Duration = Duration::from_millis(2000);

#[derive(Clone)]
pub struct Db {
    pool: Pool<SqliteConnectionManager>,
}

impl Db {
    /// Opens (or creates) the database file and brings the schema up to the
    /// latest version before handing out any connections.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreQueryError> {
        let manager = SqliteConnectionManager::file(path.as_ref()).with_init(|conn| {
            conn.busy_timeout(BUSY_TIMEOUT)?;
            configure_connection(conn)
        });

        let pool = Pool::new(manager)
            .map_err(|e| StoreQueryError::query("failed to create db pool", e))?;
        let mut conn = pool
            .get()
            .map_err(|e| StoreQueryError::Pool(e.to_string()))?;
        migrations::apply_migrations(&mut conn)?;

        Ok(Self { pool })
    }

    pub fn open_connection(
        &self,
    ) -> Result<r2d2::PooledConnection<SqliteConnectionManager>, StoreQueryError> {
        self.pool
            .get()
            .map_err(|e| StoreQueryError::Pool(e.to_string()))
    }
}

fn configure_connection(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.pragma_update(None, "synchronous", "NORMAL")?;
    conn.pragma_update(None, "foreign_keys", "ON")?;
    Ok(())
}
