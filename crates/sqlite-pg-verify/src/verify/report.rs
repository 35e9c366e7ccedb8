//! Report model for a verification run.
//!
//! The report is the tool's contract with the surrounding automation: a
//! stable machine-readable shape (serde) plus a human-readable rendering.
//! It is deterministic by construction (no timestamps, no durations, tables
//! in sorted order), so two runs against unchanged stores serialize
//! byte-identically.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::exit_codes;

/// A detected structural or quantitative difference between the stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mismatch {
    /// Table present in source but absent in target.
    MissingTable { table: String },

    /// Columns present in the source table but absent in the target table.
    ColumnMismatch {
        table: String,
        missing_columns: Vec<String>,
    },

    /// Row counts differ; both counts are carried verbatim.
    RowCountMismatch {
        table: String,
        source_count: i64,
        target_count: i64,
    },
}

impl Mismatch {
    /// Name of the table this mismatch is about.
    pub fn table(&self) -> &str {
        match self {
            Mismatch::MissingTable { table }
            | Mismatch::ColumnMismatch { table, .. }
            | Mismatch::RowCountMismatch { table, .. } => table,
        }
    }

    /// One-line human-readable description, without the table name.
    pub fn describe(&self) -> String {
        match self {
            Mismatch::MissingTable { .. } => "missing from target".to_string(),
            Mismatch::ColumnMismatch {
                missing_columns, ..
            } => format!(
                "columns missing from target: {}",
                missing_columns.join(", ")
            ),
            Mismatch::RowCountMismatch {
                source_count,
                target_count,
                ..
            } => format!(
                "row count mismatch (source: {}, target: {})",
                source_count, target_count
            ),
        }
    }
}

/// Overall classification of a verification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    /// No mismatches.
    Pass,
    /// Mismatches confined to allow-listed tables.
    Warning,
    /// At least one mismatch outside the allow-list.
    Fail,
}

impl Verdict {
    /// Process exit code for this verdict.
    pub fn exit_code(self) -> u8 {
        match self {
            Verdict::Pass => exit_codes::PASS,
            Verdict::Warning => exit_codes::WARNING,
            Verdict::Fail => exit_codes::FAIL,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::Warning => write!(f, "WARNING"),
            Verdict::Fail => write!(f, "FAIL"),
        }
    }
}

/// Structured result of a verification run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyReport {
    /// Overall verdict.
    pub verdict: Verdict,

    /// Number of source tables verified (after exclusions).
    pub tables_checked: usize,

    /// Source tables with no mismatch of any kind.
    pub tables_passed: usize,

    /// Every detected mismatch, allow-listed or not.
    pub mismatches: Vec<Mismatch>,

    /// The allow-list that was in effect, sorted.
    pub allowed_tables: Vec<String>,
}

impl VerifyReport {
    /// Whether the run found no mismatches at all.
    pub fn is_pass(&self) -> bool {
        self.verdict == Verdict::Pass
    }

    /// Whether a mismatch is downgraded by the allow-list.
    pub fn is_allowed(&self, mismatch: &Mismatch) -> bool {
        self.allowed_tables
            .iter()
            .any(|t| t.eq_ignore_ascii_case(mismatch.table()))
    }

    /// Serialize to pretty JSON for machine consumption.
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Human-readable rendering for terminal output.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str("Verification Summary:\n");
        out.push_str(&format!("  Verdict: {}\n", self.verdict));
        out.push_str(&format!("  Tables checked: {}\n", self.tables_checked));
        out.push_str(&format!("  Tables passed: {}\n", self.tables_passed));

        if self.mismatches.is_empty() {
            out.push_str("  Mismatches: none\n");
        } else {
            out.push_str("  Mismatches:\n");
            for mismatch in &self.mismatches {
                let marker = if self.is_allowed(mismatch) { '!' } else { '✗' };
                out.push_str(&format!(
                    "    {} {}: {}\n",
                    marker,
                    mismatch.table(),
                    mismatch.describe()
                ));
            }
        }

        out
    }
}

/// Build the report from collected mismatches and the caller's allow-list.
///
/// The engine is policy-free about which tables are non-critical; the
/// allow-list is the caller's classification. Allow-listed mismatches
/// downgrade the verdict to `WARNING` but remain in the detailed output.
pub fn produce_report(
    tables_checked: usize,
    mismatches: Vec<Mismatch>,
    allow_tables: &[String],
) -> VerifyReport {
    let allowed = |m: &Mismatch| {
        allow_tables
            .iter()
            .any(|t| t.eq_ignore_ascii_case(m.table()))
    };

    let verdict = if mismatches.is_empty() {
        Verdict::Pass
    } else if mismatches.iter().all(allowed) {
        Verdict::Warning
    } else {
        Verdict::Fail
    };

    let mismatched_tables: BTreeSet<String> = mismatches
        .iter()
        .map(|m| m.table().to_ascii_lowercase())
        .collect();

    let mut allowed_tables: Vec<String> = allow_tables.to_vec();
    allowed_tables.sort();
    allowed_tables.dedup();

    VerifyReport {
        verdict,
        tables_checked,
        tables_passed: tables_checked.saturating_sub(mismatched_tables.len()),
        mismatches,
        allowed_tables,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_mismatch(table: &str, source: i64, target: i64) -> Mismatch {
        Mismatch::RowCountMismatch {
            table: table.to_string(),
            source_count: source,
            target_count: target,
        }
    }

    #[test]
    fn test_empty_mismatches_pass() {
        let report = produce_report(5, vec![], &[]);
        assert_eq!(report.verdict, Verdict::Pass);
        assert_eq!(report.tables_passed, 5);
        assert_eq!(report.verdict.exit_code(), 0);
    }

    #[test]
    fn test_mismatch_outside_allow_list_fails() {
        let report = produce_report(2, vec![count_mismatch("orders", 100, 95)], &[]);
        assert_eq!(report.verdict, Verdict::Fail);
        assert_eq!(report.tables_passed, 1);
        assert_eq!(report.verdict.exit_code(), 3);
    }

    #[test]
    fn test_allow_list_downgrades_to_warning_but_keeps_detail() {
        let mismatch = count_mismatch("audit_logs", 10, 0);
        let report = produce_report(
            2,
            vec![mismatch.clone()],
            &["audit_logs".to_string()],
        );
        assert_eq!(report.verdict, Verdict::Warning);
        assert_eq!(report.verdict.exit_code(), 2);
        // The mismatch record itself is still present in the detailed output.
        assert_eq!(report.mismatches, vec![mismatch]);
    }

    #[test]
    fn test_mixed_mismatches_still_fail() {
        let report = produce_report(
            3,
            vec![
                count_mismatch("audit_logs", 10, 0),
                count_mismatch("orders", 100, 95),
            ],
            &["audit_logs".to_string()],
        );
        assert_eq!(report.verdict, Verdict::Fail);
        assert_eq!(report.tables_passed, 1);
    }

    #[test]
    fn test_allow_list_match_is_case_insensitive() {
        let report = produce_report(
            1,
            vec![count_mismatch("Audit_Logs", 10, 0)],
            &["audit_logs".to_string()],
        );
        assert_eq!(report.verdict, Verdict::Warning);
    }

    #[test]
    fn test_json_shape_is_tagged() {
        let report = produce_report(
            1,
            vec![Mismatch::MissingTable {
                table: "payments".to_string(),
            }],
            &[],
        );
        let json = report.to_json().unwrap();
        assert!(json.contains("\"verdict\": \"FAIL\""));
        assert!(json.contains("\"kind\": \"missing_table\""));
        assert!(json.contains("\"table\": \"payments\""));
    }

    #[test]
    fn test_render_text_marks_allowed_mismatches() {
        let report = produce_report(
            2,
            vec![
                count_mismatch("audit_logs", 10, 0),
                Mismatch::MissingTable {
                    table: "payments".to_string(),
                },
            ],
            &["audit_logs".to_string()],
        );
        let text = report.render_text();
        assert!(text.contains("! audit_logs: row count mismatch (source: 10, target: 0)"));
        assert!(text.contains("✗ payments: missing from target"));
        assert!(text.contains("Verdict: FAIL"));
    }
}
