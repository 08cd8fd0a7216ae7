//! SQL DDL for the local diary store.
//!
//! One collection (`memories`, keyed by `id`) plus `schema_meta`, which records the
//! store version. All DDL uses `IF NOT EXISTS` for idempotent initialization.

use rusqlite::{Connection, OptionalExtension};

/// Name of the single entry collection.
pub const COLLECTION: &str = "memories";

/// Store version this binary writes. Bump only when the schema changes.
pub const STORE_VERSION: u32 = 1;

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS memories (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    date TEXT NOT NULL,
    content TEXT NOT NULL,
    tags TEXT,
    image_url TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS schema_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

/// Initialize all schema tables. Idempotent (uses IF NOT EXISTS).
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_meta (key, value) VALUES ('store_version', ?1)",
        [STORE_VERSION.to_string()],
    )?;
    Ok(())
}

/// Read the stored version. `None` if the meta row is missing.
pub fn get_store_version(conn: &Connection) -> rusqlite::Result<Option<u32>> {
    conn.query_row(
        "SELECT value FROM schema_meta WHERE key = 'store_version'",
        [],
        |row| {
            let val: String = row.get(0)?;
            Ok(val.parse::<u32>().unwrap_or(0))
        },
    )
    .optional()
}
