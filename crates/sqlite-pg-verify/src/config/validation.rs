//! Configuration validation.

use super::Config;
use crate::error::{Result, VerifyError};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    // Source validation
    if config.source.path.as_os_str().is_empty() {
        return Err(VerifyError::Config("source.path is required".into()));
    }
    if config.source.r#type != "sqlite" {
        return Err(VerifyError::Config(format!(
            "source.type must be 'sqlite', got '{}'",
            config.source.r#type
        )));
    }

    // Target validation
    if config.target.host.is_empty() {
        return Err(VerifyError::Config("target.host is required".into()));
    }
    if config.target.database.is_empty() {
        return Err(VerifyError::Config("target.database is required".into()));
    }
    if config.target.user.is_empty() {
        return Err(VerifyError::Config("target.user is required".into()));
    }
    if config.target.r#type != "postgres" {
        return Err(VerifyError::Config(format!(
            "target.type must be 'postgres', got '{}'",
            config.target.r#type
        )));
    }

    // Verify config validation - only check if explicitly set
    if let Some(0) = config.verify.max_connections {
        return Err(VerifyError::Config(
            "verify.max_connections must be at least 1".into(),
        ));
    }

    // A table cannot be both excluded and allow-listed
    for table in &config.verify.allow_tables {
        if config
            .verify
            .exclude_tables
            .iter()
            .any(|t| t.eq_ignore_ascii_case(table))
        {
            return Err(VerifyError::Config(format!(
                "table '{}' appears in both allow_tables and exclude_tables",
                table
            )));
        }
    }

    Ok(())
}
