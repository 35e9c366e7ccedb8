//! Error types for the verification library.

use thiserror::Error;

/// Process exit codes consumed by the surrounding deploy automation.
///
/// The codes are part of the tool's contract: build pipelines branch on them
/// to decide whether to proceed, hold, or abort a deployment.
pub mod exit_codes {
    /// Verification passed with no mismatches.
    pub const PASS: u8 = 0;
    /// Invalid or missing configuration.
    pub const CONFIG_ERROR: u8 = 1;
    /// Mismatches found, but only in allow-listed tables.
    pub const WARNING: u8 = 2;
    /// Mismatches found outside the allow-list.
    pub const FAIL: u8 = 3;
    /// Either store was unreachable; no report was produced.
    pub const CONNECTION_ERROR: u8 = 4;
    /// File system error (config file unreadable, etc.)
    pub const IO_ERROR: u8 = 7;
}

/// Main error type for verification operations.
#[derive(Error, Debug)]
pub enum VerifyError {
    /// Configuration error (invalid YAML values, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Source database (SQLite) connection or query error
    #[error("Source database error: {0}")]
    Source(#[from] rusqlite::Error),

    /// Target database (PostgreSQL) connection or query error
    #[error("Target database error: {0}")]
    Target(#[from] tokio_postgres::Error),

    /// Connection pool error with context
    #[error("Pool error: {message}\n  Context: {context}")]
    Pool { message: String, context: String },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VerifyError {
    /// Create a Pool error with context about where it occurred
    pub fn pool(message: impl Into<String>, context: impl Into<String>) -> Self {
        VerifyError::Pool {
            message: message.into(),
            context: context.into(),
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            VerifyError::Config(_) | VerifyError::Yaml(_) => exit_codes::CONFIG_ERROR,
            VerifyError::Source(_) | VerifyError::Target(_) | VerifyError::Pool { .. } => {
                exit_codes::CONNECTION_ERROR
            }
            VerifyError::Io(_) | VerifyError::Json(_) => exit_codes::IO_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for verification operations.
pub type Result<T> = std::result::Result<T, VerifyError>;
