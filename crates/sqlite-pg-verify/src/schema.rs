//! Schema descriptor types for database tables and columns.
//!
//! These types provide a database-agnostic representation of schema metadata
//! used throughout the verification pass. Names are compared
//! case-insensitively, since SQLite identifiers are case-insensitive and
//! PostgreSQL folds unquoted identifiers to lowercase.

use serde::{Deserialize, Serialize};

/// Storage-agnostic classification of a column type.
///
/// SQLite declared types and PostgreSQL `udt_name`s are both normalized to
/// this enum (see [`crate::typemap`]) so the report can describe columns
/// without leaking either engine's spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    Integer,
    Real,
    Text,
    Blob,
    Boolean,
    Timestamp,
    Numeric,
    Other,
}

/// Column metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name.
    pub name: String,

    /// Semantic data type.
    pub data_type: SemanticType,

    /// Raw type as declared by the store (e.g., "VARCHAR(64)", "int8").
    pub declared_type: String,

    /// Whether the column allows NULL.
    pub is_nullable: bool,

    /// Ordinal position (1-based).
    pub ordinal_pos: i32,
}

/// Table metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDescriptor {
    /// Table name.
    pub name: String,

    /// Column definitions in ordinal order.
    pub columns: Vec<ColumnDescriptor>,
}

impl TableDescriptor {
    /// Look up a column by name, case-insensitively.
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Check whether the table has a column with the given name.
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }
}
