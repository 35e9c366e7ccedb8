//! Type normalization from store-specific type names to [`SemanticType`].
//!
//! SQLite classification follows the declared-type affinity rules (substring
//! matching on the declaration), so anything an ORM emitted for the source
//! schema lands in the same bucket the engine would give it. PostgreSQL
//! classification matches on `udt_name` from `information_schema.columns`.

use crate::schema::SemanticType;

/// Classify a SQLite declared type (as reported by `PRAGMA table_info`).
///
/// SQLite permits columns with no declared type at all; those map to
/// [`SemanticType::Other`].
pub fn semantic_from_sqlite(declared: &str) -> SemanticType {
    let decl = declared.to_ascii_lowercase();

    if decl.is_empty() {
        return SemanticType::Other;
    }
    // Substring checks mirror SQLite's affinity algorithm, ordered the same
    // way: INT first, then text, then blob, then real.
    if decl.contains("int") {
        SemanticType::Integer
    } else if decl.contains("char") || decl.contains("clob") || decl.contains("text") {
        SemanticType::Text
    } else if decl.contains("blob") {
        SemanticType::Blob
    } else if decl.contains("real") || decl.contains("floa") || decl.contains("doub") {
        SemanticType::Real
    } else if decl.contains("bool") {
        SemanticType::Boolean
    } else if decl.contains("date") || decl.contains("time") {
        SemanticType::Timestamp
    } else if decl.contains("dec") || decl.contains("num") {
        SemanticType::Numeric
    } else {
        SemanticType::Other
    }
}

/// Classify a PostgreSQL `udt_name`.
pub fn semantic_from_postgres(udt_name: &str) -> SemanticType {
    match udt_name.to_ascii_lowercase().as_str() {
        "int2" | "int4" | "int8" | "smallint" | "integer" | "bigint" => SemanticType::Integer,
        "float4" | "float8" | "real" | "double precision" => SemanticType::Real,
        "text" | "varchar" | "bpchar" | "char" | "name" | "citext" => SemanticType::Text,
        "bytea" => SemanticType::Blob,
        "bool" | "boolean" => SemanticType::Boolean,
        "timestamp" | "timestamptz" | "date" | "time" | "timetz" => SemanticType::Timestamp,
        "numeric" | "decimal" | "money" => SemanticType::Numeric,
        _ => SemanticType::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlite_integer_affinity() {
        assert_eq!(semantic_from_sqlite("INTEGER"), SemanticType::Integer);
        assert_eq!(semantic_from_sqlite("BIGINT"), SemanticType::Integer);
        assert_eq!(semantic_from_sqlite("tinyint(1)"), SemanticType::Integer);
    }

    #[test]
    fn test_sqlite_text_affinity() {
        assert_eq!(semantic_from_sqlite("VARCHAR(64)"), SemanticType::Text);
        assert_eq!(semantic_from_sqlite("NVARCHAR(255)"), SemanticType::Text);
        assert_eq!(semantic_from_sqlite("TEXT"), SemanticType::Text);
        assert_eq!(semantic_from_sqlite("CLOB"), SemanticType::Text);
    }

    #[test]
    fn test_sqlite_misc_types() {
        assert_eq!(semantic_from_sqlite("BLOB"), SemanticType::Blob);
        assert_eq!(semantic_from_sqlite("REAL"), SemanticType::Real);
        assert_eq!(semantic_from_sqlite("DOUBLE"), SemanticType::Real);
        assert_eq!(semantic_from_sqlite("BOOLEAN"), SemanticType::Boolean);
        assert_eq!(semantic_from_sqlite("DATETIME"), SemanticType::Timestamp);
        assert_eq!(semantic_from_sqlite("NUMERIC(10,2)"), SemanticType::Numeric);
        assert_eq!(semantic_from_sqlite(""), SemanticType::Other);
    }

    #[test]
    fn test_postgres_types() {
        assert_eq!(semantic_from_postgres("int4"), SemanticType::Integer);
        assert_eq!(semantic_from_postgres("int8"), SemanticType::Integer);
        assert_eq!(semantic_from_postgres("varchar"), SemanticType::Text);
        assert_eq!(semantic_from_postgres("bytea"), SemanticType::Blob);
        assert_eq!(semantic_from_postgres("bool"), SemanticType::Boolean);
        assert_eq!(semantic_from_postgres("timestamptz"), SemanticType::Timestamp);
        assert_eq!(semantic_from_postgres("numeric"), SemanticType::Numeric);
        assert_eq!(semantic_from_postgres("jsonb"), SemanticType::Other);
    }

    #[test]
    fn test_same_bucket_across_stores() {
        // A SQLAlchemy Integer column lands as INTEGER in SQLite and int4 in
        // PostgreSQL; both must classify identically.
        assert_eq!(
            semantic_from_sqlite("INTEGER"),
            semantic_from_postgres("int4")
        );
        assert_eq!(
            semantic_from_sqlite("VARCHAR(64)"),
            semantic_from_postgres("varchar")
        );
        assert_eq!(
            semantic_from_sqlite("DATETIME"),
            semantic_from_postgres("timestamp")
        );
    }
}
