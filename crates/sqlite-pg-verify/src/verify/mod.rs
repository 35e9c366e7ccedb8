//! Verification engine: schema check, row-count check, report.
//!
//! A run is a single sequential pass over both stores:
//!
//! 1. **SchemaCheck**: every source table must exist in the target with an
//!    equal-or-superset column set. Extra target tables and columns are
//!    tolerated (audit columns, platform additions).
//! 2. **RowCountCheck**: exact counts are compared for every table the
//!    stores share, including tables that already produced column mismatches.
//! 3. **Reported**: all findings are folded into one [`VerifyReport`].
//!
//! Mismatches never abort the run; one invocation yields the complete
//! diagnostic picture. Connectivity failures do abort it, with no report.
//! The pass assumes quiescent stores: counts are read once, and nothing
//! re-checks for concurrent writers.

pub mod report;

pub use report::{produce_report, Mismatch, Verdict, VerifyReport};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;
use crate::schema::TableDescriptor;
use crate::store::{PgStore, SqliteStore, Store};

/// Phase of a verification run. Phases always execute in declaration order;
/// none may be skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyPhase {
    Idle,
    SchemaCheck,
    RowCountCheck,
    Reported,
}

impl fmt::Display for VerifyPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyPhase::Idle => write!(f, "idle"),
            VerifyPhase::SchemaCheck => write!(f, "schema-check"),
            VerifyPhase::RowCountCheck => write!(f, "row-count-check"),
            VerifyPhase::Reported => write!(f, "reported"),
        }
    }
}

/// Caller-supplied policy for a verification run.
#[derive(Debug, Clone, Default)]
pub struct VerifyOptions {
    /// Tables whose mismatches downgrade the verdict to WARNING.
    pub allow_tables: Vec<String>,

    /// Tables skipped entirely.
    pub exclude_tables: Vec<String>,
}

/// Row counts for one shared table, read once per store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCount {
    pub table: String,
    pub source_count: i64,
    pub target_count: i64,
}

/// Result of a connectivity health check against both stores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub source_connected: bool,
    pub source_latency_ms: u64,
    pub source_error: Option<String>,
    pub target_connected: bool,
    pub target_latency_ms: u64,
    pub target_error: Option<String>,
    pub healthy: bool,
}

/// Engine for a single verification pass. Owns no long-lived state beyond
/// the store handles; it never mutates either store.
pub struct VerifyEngine {
    source: Arc<dyn Store>,
    target: Arc<dyn Store>,
    options: VerifyOptions,
}

impl VerifyEngine {
    /// Create an engine over two already-connected stores.
    pub fn new(source: Arc<dyn Store>, target: Arc<dyn Store>, options: VerifyOptions) -> Self {
        Self {
            source,
            target,
            options,
        }
    }

    /// Connect both stores from configuration and build the engine.
    pub async fn connect(config: &Config) -> Result<Self> {
        let source = SqliteStore::open(&config.source.path).await?;
        let target = PgStore::connect(&config.target, config.verify.get_max_connections()).await?;
        Ok(Self::new(
            Arc::new(source),
            Arc::new(target),
            VerifyOptions {
                allow_tables: config.verify.allow_tables.clone(),
                exclude_tables: config.verify.exclude_tables.clone(),
            },
        ))
    }

    /// Run the full pass: schema check, row-count check, report.
    pub async fn run(&self) -> Result<VerifyReport> {
        info!(
            "Starting verification: {} -> {}",
            self.source.db_type(),
            self.target.db_type()
        );

        // Phase 1: schema check
        info!(phase = %VerifyPhase::SchemaCheck, "Extracting table descriptors");
        let (source_tables, target_tables) =
            tokio::join!(self.source.list_tables(), self.target.list_tables());
        let mut source_tables = source_tables?;
        let target_tables = target_tables?;

        source_tables.retain(|t| !self.is_excluded(&t.name));
        // Report order is sorted source table name order.
        source_tables.sort_by(|a, b| a.name.cmp(&b.name));

        info!(
            "Source: {} tables, target: {} tables ({} excluded by config)",
            source_tables.len(),
            target_tables.len(),
            self.options.exclude_tables.len()
        );

        let mut mismatches = compare_schemas(&source_tables, &target_tables);
        debug!(
            phase = %VerifyPhase::SchemaCheck,
            "{} schema mismatches",
            mismatches.len()
        );

        // Phase 2: row counts for every table both stores have. Tables
        // missing from the target were already reported and cannot be
        // counted there; the rest proceed even when their columns diverged.
        info!(phase = %VerifyPhase::RowCountCheck, "Comparing row counts");
        let mut counts = Vec::new();
        for table in &source_tables {
            let Some(target_table) = find_table(&target_tables, &table.name) else {
                continue;
            };
            let (source_count, target_count) = tokio::join!(
                self.source.row_count(&table.name),
                self.target.row_count(&target_table.name)
            );
            counts.push(TableCount {
                table: table.name.clone(),
                source_count: source_count?,
                target_count: target_count?,
            });
        }
        mismatches.extend(compare_row_counts(&counts));

        // Phase 3: report
        let report = produce_report(
            source_tables.len(),
            mismatches,
            &self.options.allow_tables,
        );
        info!(
            phase = %VerifyPhase::Reported,
            verdict = %report.verdict,
            "Verification complete: {} mismatches across {} tables",
            report.mismatches.len(),
            report.tables_checked
        );
        Ok(report)
    }

    /// Probe both stores and report connectivity and latency. Unlike
    /// [`run`](Self::run), failures here are data, not errors.
    pub async fn health_check(&self) -> HealthCheckResult {
        let started = Instant::now();
        let source_result = self.source.ping().await;
        let source_latency_ms = started.elapsed().as_millis() as u64;

        let started = Instant::now();
        let target_result = self.target.ping().await;
        let target_latency_ms = started.elapsed().as_millis() as u64;

        let healthy = source_result.is_ok() && target_result.is_ok();
        HealthCheckResult {
            source_connected: source_result.is_ok(),
            source_latency_ms,
            source_error: source_result.err().map(|e| e.to_string()),
            target_connected: target_result.is_ok(),
            target_latency_ms,
            target_error: target_result.err().map(|e| e.to_string()),
            healthy,
        }
    }

    /// Source-side table descriptors, with exclusions applied.
    pub async fn source_tables(&self) -> Result<Vec<TableDescriptor>> {
        let mut tables = self.source.list_tables().await?;
        tables.retain(|t| !self.is_excluded(&t.name));
        Ok(tables)
    }

    /// Target-side table descriptors.
    pub async fn target_tables(&self) -> Result<Vec<TableDescriptor>> {
        self.target.list_tables().await
    }

    /// Release both stores' connections.
    pub async fn close(&self) {
        self.source.close().await;
        self.target.close().await;
    }

    fn is_excluded(&self, table: &str) -> bool {
        self.options
            .exclude_tables
            .iter()
            .any(|t| t.eq_ignore_ascii_case(table))
    }
}

/// Look up a table by name, case-insensitively. SQLite identifiers are
/// case-insensitive and PostgreSQL folds unquoted names to lowercase, so an
/// exact-case match would report false positives.
fn find_table<'a>(tables: &'a [TableDescriptor], name: &str) -> Option<&'a TableDescriptor> {
    tables.iter().find(|t| t.name.eq_ignore_ascii_case(name))
}

/// Compare schemas: every source table must exist in target with an
/// equal-or-superset column set. Extra target tables/columns are not errors.
pub fn compare_schemas(
    source_tables: &[TableDescriptor],
    target_tables: &[TableDescriptor],
) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();

    for table in source_tables {
        match find_table(target_tables, &table.name) {
            None => mismatches.push(Mismatch::MissingTable {
                table: table.name.clone(),
            }),
            Some(target_table) => {
                let missing_columns: Vec<String> = table
                    .columns
                    .iter()
                    .filter(|c| !target_table.has_column(&c.name))
                    .map(|c| c.name.clone())
                    .collect();
                if !missing_columns.is_empty() {
                    mismatches.push(Mismatch::ColumnMismatch {
                        table: table.name.clone(),
                        missing_columns,
                    });
                }
            }
        }
    }

    mismatches
}

/// Compare row counts gathered for shared tables; unequal counts become
/// mismatches carrying both values verbatim.
pub fn compare_row_counts(counts: &[TableCount]) -> Vec<Mismatch> {
    counts
        .iter()
        .filter(|c| c.source_count != c.target_count)
        .map(|c| Mismatch::RowCountMismatch {
            table: c.table.clone(),
            source_count: c.source_count,
            target_count: c.target_count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnDescriptor, SemanticType};

    fn column(name: &str) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.to_string(),
            data_type: SemanticType::Integer,
            declared_type: "INTEGER".to_string(),
            is_nullable: true,
            ordinal_pos: 1,
        }
    }

    fn table(name: &str, columns: &[&str]) -> TableDescriptor {
        TableDescriptor {
            name: name.to_string(),
            columns: columns.iter().map(|c| column(c)).collect(),
        }
    }

    #[test]
    fn test_identical_schemas_have_no_mismatches() {
        let source = vec![table("users", &["id", "username"])];
        let target = vec![table("users", &["id", "username"])];
        assert!(compare_schemas(&source, &target).is_empty());
    }

    #[test]
    fn test_missing_table_reported_once() {
        let source = vec![table("orders", &["id"]), table("users", &["id"])];
        let target = vec![table("users", &["id"])];
        let mismatches = compare_schemas(&source, &target);
        assert_eq!(
            mismatches,
            vec![Mismatch::MissingTable {
                table: "orders".to_string()
            }]
        );
    }

    #[test]
    fn test_missing_column_reported() {
        let source = vec![table("orders", &["id", "order_counter", "edit_count"])];
        let target = vec![table("orders", &["id"])];
        let mismatches = compare_schemas(&source, &target);
        assert_eq!(
            mismatches,
            vec![Mismatch::ColumnMismatch {
                table: "orders".to_string(),
                missing_columns: vec!["order_counter".to_string(), "edit_count".to_string()],
            }]
        );
    }

    #[test]
    fn test_extra_target_tables_and_columns_tolerated() {
        let source = vec![table("users", &["id"])];
        let target = vec![
            table("users", &["id", "created_by_migration"]),
            table("alembic_version", &["version_num"]),
        ];
        assert!(compare_schemas(&source, &target).is_empty());
    }

    #[test]
    fn test_table_match_is_case_insensitive() {
        let source = vec![table("Users", &["Id"])];
        let target = vec![table("users", &["id"])];
        assert!(compare_schemas(&source, &target).is_empty());
    }

    #[test]
    fn test_equal_counts_have_no_mismatches() {
        let counts = vec![TableCount {
            table: "users".to_string(),
            source_count: 5,
            target_count: 5,
        }];
        assert!(compare_row_counts(&counts).is_empty());
    }

    #[test]
    fn test_unequal_counts_carry_both_values() {
        let counts = vec![
            TableCount {
                table: "users".to_string(),
                source_count: 5,
                target_count: 5,
            },
            TableCount {
                table: "orders".to_string(),
                source_count: 100,
                target_count: 95,
            },
        ];
        let mismatches = compare_row_counts(&counts);
        assert_eq!(
            mismatches,
            vec![Mismatch::RowCountMismatch {
                table: "orders".to_string(),
                source_count: 100,
                target_count: 95,
            }]
        );
    }

    #[test]
    fn test_partially_migrated_orders_table_fails() {
        // source {users: 5, orders: 100}, target {users: 5, orders: 95}
        let source = vec![
            table("orders", &["id"]),
            table("users", &["id"]),
        ];
        let target = vec![
            table("orders", &["id"]),
            table("users", &["id"]),
        ];
        let mut mismatches = compare_schemas(&source, &target);
        mismatches.extend(compare_row_counts(&[
            TableCount {
                table: "orders".to_string(),
                source_count: 100,
                target_count: 95,
            },
            TableCount {
                table: "users".to_string(),
                source_count: 5,
                target_count: 5,
            },
        ]));
        let report = produce_report(2, mismatches, &[]);
        assert_eq!(report.verdict, Verdict::Fail);
        assert_eq!(
            report.mismatches,
            vec![Mismatch::RowCountMismatch {
                table: "orders".to_string(),
                source_count: 100,
                target_count: 95,
            }]
        );
    }

    #[test]
    fn test_single_table_in_sync_passes() {
        // source and target both have {users: 5 rows} only
        let source = vec![table("users", &["id"])];
        let target = vec![table("users", &["id"])];
        let mut mismatches = compare_schemas(&source, &target);
        mismatches.extend(compare_row_counts(&[TableCount {
            table: "users".to_string(),
            source_count: 5,
            target_count: 5,
        }]));
        let report = produce_report(1, mismatches, &[]);
        assert_eq!(report.verdict, Verdict::Pass);
        assert!(report.mismatches.is_empty());
    }
}
