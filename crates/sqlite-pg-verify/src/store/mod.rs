//! Store abstraction over the two databases being compared.
//!
//! The verification engine only speaks [`Store`]; the SQLite source and the
//! PostgreSQL target each implement it. Both are strictly read-only: nothing
//! in this module mutates either database.

mod postgres;
mod sqlite;

pub use postgres::PgStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::schema::TableDescriptor;

/// Read-only access to one of the stores under comparison.
#[async_trait]
pub trait Store: Send + Sync {
    /// Enumerate user tables with column metadata, sorted by table name.
    ///
    /// Fails if the store is unreachable; a reachable store with no tables
    /// returns an empty list.
    async fn list_tables(&self) -> Result<Vec<TableDescriptor>>;

    /// Exact row count for a table.
    ///
    /// Counts are read once per run; the caller is responsible for freezing
    /// writers if it needs a stable result.
    async fn row_count(&self, table: &str) -> Result<i64>;

    /// Cheap connectivity probe.
    async fn ping(&self) -> Result<()>;

    /// Store type identifier (e.g., "sqlite", "postgres").
    fn db_type(&self) -> &str;

    /// Release any held connections.
    async fn close(&self);
}

/// Quote an identifier for interpolation into a query.
///
/// Table names come from the store's own catalog, but they still get quoted:
/// both engines accept the double-quote form.
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
