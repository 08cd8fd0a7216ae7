pub mod schema;
pub mod store;

pub use store::LocalStore;

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Faults raised by the local store. Callers in the sync layer log these and
/// degrade; they never reach the user as a failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to open store at {path}: {source}")]
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },
    #[error("store version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to encode entry: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("store lock poisoned")]
    Poisoned,
    #[error("store task failed: {0}")]
    Task(String),
}

/// Open (or create) the diary store at the given path with schema initialized.
pub fn open_database(path: impl AsRef<Path>) -> Result<Connection, StoreError> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let conn = Connection::open(path).map_err(|source| StoreError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    conn.pragma_update(None, "journal_mode", "WAL")?;
    conn.busy_timeout(Duration::from_millis(5000))?;

    prepare(&conn)?;

    tracing::debug!(path = %path.display(), "diary store opened");
    Ok(conn)
}

/// Open an in-memory store, used by tests and dry runs.
pub fn open_memory_database() -> Result<Connection, StoreError> {
    let conn = Connection::open_in_memory()?;
    prepare(&conn)?;
    Ok(conn)
}

fn prepare(conn: &Connection) -> Result<(), StoreError> {
    schema::init_schema(conn)?;
    let found = schema::get_store_version(conn)?.unwrap_or(0);
    if found > schema::STORE_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found,
            supported: schema::STORE_VERSION,
        });
    }
    Ok(())
}

/// Result of [`check_store_health`].
#[derive(Debug)]
pub struct HealthReport {
    pub store_version: u32,
    pub entry_count: u64,
    pub integrity_ok: bool,
    pub integrity_details: String,
}

/// Run diagnostics on an open store connection.
pub fn check_store_health(conn: &Connection) -> Result<HealthReport, StoreError> {
    let store_version = schema::get_store_version(conn)?.unwrap_or(0);
    let entry_count: i64 = conn.query_row("SELECT COUNT(*) FROM memories", [], |r| r.get(0))?;
    let integrity_details: String =
        conn.query_row("PRAGMA integrity_check", [], |r| r.get(0))?;

    Ok(HealthReport {
        store_version,
        entry_count: entry_count as u64,
        integrity_ok: integrity_details == "ok",
        integrity_details,
    })
}
