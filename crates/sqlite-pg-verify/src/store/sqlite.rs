//! SQLite source store (the database being migrated away from).
//!
//! The file is opened read-only for every operation; a verification run must
//! never mutate the source, and read-only open also refuses to create a new
//! empty database when the path is wrong.

use async_trait::async_trait;
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Result, VerifyError};
use crate::schema::{ColumnDescriptor, TableDescriptor};
use crate::store::{quote_ident, Store};
use crate::typemap;

/// SQLite store implementation.
#[derive(Debug)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    /// Open the store and probe it once, failing fast if the file is missing
    /// or not a database.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(VerifyError::Config(format!(
                "SQLite database not found at {}",
                path.display()
            )));
        }

        let store = Self { path };
        store.ping().await?;
        info!("Connected to SQLite source: {}", store.path.display());
        Ok(store)
    }

    /// Run a closure against a fresh read-only connection on the blocking
    /// thread pool. rusqlite is synchronous; opening per call keeps the store
    /// `Sync` without a mutex around a shared connection.
    async fn with_conn<T, F>(&self, context: &'static str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || {
            let conn = Connection::open_with_flags(
                &path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            f(&conn)
        })
        .await
        .map_err(|e| VerifyError::pool(e.to_string(), context))?
        .map_err(VerifyError::from)
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn list_tables(&self) -> Result<Vec<TableDescriptor>> {
        let tables = self
            .with_conn("listing SQLite tables", |conn| {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master \
                     WHERE type = 'table' AND name NOT LIKE 'sqlite_%' \
                     ORDER BY name",
                )?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<rusqlite::Result<Vec<_>>>()?;

                let mut tables = Vec::with_capacity(names.len());
                for name in names {
                    let mut stmt =
                        conn.prepare(&format!("PRAGMA table_info({})", quote_ident(&name)))?;
                    let columns = stmt
                        .query_map([], |row| {
                            let cid: i64 = row.get(0)?;
                            let col_name: String = row.get(1)?;
                            let declared: String = row.get(2)?;
                            let notnull: i64 = row.get(3)?;
                            Ok(ColumnDescriptor {
                                name: col_name,
                                data_type: typemap::semantic_from_sqlite(&declared),
                                declared_type: declared,
                                is_nullable: notnull == 0,
                                ordinal_pos: cid as i32 + 1,
                            })
                        })?
                        .collect::<rusqlite::Result<Vec<_>>>()?;
                    tables.push(TableDescriptor { name, columns });
                }
                Ok(tables)
            })
            .await?;

        debug!("SQLite source has {} tables", tables.len());
        Ok(tables)
    }

    async fn row_count(&self, table: &str) -> Result<i64> {
        let query = format!("SELECT COUNT(*) FROM {}", quote_ident(table));
        self.with_conn("counting SQLite rows", move |conn| {
            conn.query_row(&query, [], |row| row.get(0))
        })
        .await
    }

    async fn ping(&self) -> Result<()> {
        self.with_conn("probing SQLite source", |conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
        })
        .await?;
        Ok(())
    }

    fn db_type(&self) -> &str {
        "sqlite"
    }

    async fn close(&self) {
        // Connections are per-operation; nothing is held open.
    }
}
