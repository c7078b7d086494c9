//! Database schema definitions

/// Database schema version
pub const SCHEMA_VERSION: u32 = 1;

/// SQL for creating the documents table
///
/// `embedding` is a JSON-encoded array of floats and `indexed_at` an
/// ISO-8601 timestamp, matching the layout consumed by existing tooling.
pub const CREATE_DOCUMENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    path TEXT NOT NULL UNIQUE,
    content TEXT NOT NULL,
    embedding TEXT NOT NULL,
    indexed_at TEXT NOT NULL
);
"#;

/// SQL for creating the metadata table
pub const CREATE_METADATA_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// SQL for creating indexes on the documents table
pub const CREATE_DOCUMENTS_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_documents_name ON documents(name);
"#;
