//! # sqlite-pg-verify
//!
//! Verifies that a PostgreSQL database is a structurally and quantitatively
//! faithful copy of the SQLite database it was migrated from.
//!
//! The check is a single read-only pass: every source table must be present
//! in the target with an equal-or-superset column set, and row counts must
//! match table by table. All findings are collected into one deterministic
//! report with a `PASS` / `WARNING` / `FAIL` verdict, so deployment
//! automation can branch on the exit code instead of parsing output.
//!
//! The verifier assumes quiescent stores: freeze writes before invoking it
//! if you need a stable result. It never mutates either database.
//!
//! ## Example
//!
//! ```rust,no_run
//! use sqlite_pg_verify::{Config, VerifyEngine};
//!
//! #[tokio::main]
//! async fn main() -> sqlite_pg_verify::Result<()> {
//!     let config = Config::load("verify.yaml")?;
//!     let engine = VerifyEngine::connect(&config).await?;
//!     let report = engine.run().await?;
//!     println!("{}", report.render_text());
//!     std::process::exit(report.verdict.exit_code() as i32)
//! }
//! ```

pub mod config;
pub mod error;
pub mod schema;
pub mod store;
pub mod typemap;
pub mod verify;

// Re-exports for convenient access
pub use config::{Config, SourceConfig, TargetConfig, VerifyConfig};
pub use error::{exit_codes, Result, VerifyError};
pub use schema::{ColumnDescriptor, SemanticType, TableDescriptor};
pub use store::{PgStore, SqliteStore, Store};
pub use verify::{
    HealthCheckResult, Mismatch, Verdict, VerifyEngine, VerifyOptions, VerifyReport,
};
