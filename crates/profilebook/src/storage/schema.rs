//! `SQLite` schema definitions for profilebook.
//!
//! Each profile is one JSON document in the `profiles` table; identity and
//! timestamps live in their own columns so the store can order and stamp them.

/// SQL statement to create the profiles table.
pub const CREATE_PROFILES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS profiles (
    id TEXT PRIMARY KEY,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    document TEXT NOT NULL
)
";

/// SQL statement to create an index on `created_at` for newest-first listing.
pub const CREATE_CREATED_AT_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_profiles_created_at ON profiles(created_at DESC)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_PROFILES_TABLE,
    CREATE_CREATED_AT_INDEX,
    CREATE_METADATA_TABLE,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.is_empty());
        }
    }

    #[test]
    fn test_create_profiles_table_contains_required_columns() {
        assert!(CREATE_PROFILES_TABLE.contains("id TEXT PRIMARY KEY"));
        assert!(CREATE_PROFILES_TABLE.contains("created_at INTEGER NOT NULL"));
        assert!(CREATE_PROFILES_TABLE.contains("updated_at INTEGER NOT NULL"));
        assert!(CREATE_PROFILES_TABLE.contains("document TEXT NOT NULL"));
    }

    #[test]
    fn test_create_metadata_table_structure() {
        assert!(CREATE_METADATA_TABLE.contains("key TEXT PRIMARY KEY"));
        assert!(CREATE_METADATA_TABLE.contains("value TEXT NOT NULL"));
    }
}
