//! The local durable store: upsert, list, and delete of diary entries.
//!
//! [`LocalStore`] owns a lazily acquired connection. Every operation acquires it
//! through [`LocalStore::open`], runs inside its own transaction, and hands the
//! connection back. A file-backed connection that hit an error is dropped so the
//! next call re-acquires a fresh one.

use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{HealthReport, StoreError};
use crate::memory::types::DiaryEntry;

#[derive(Debug, Clone)]
enum Location {
    File(PathBuf),
    Memory,
}

pub struct LocalStore {
    location: Location,
    conn: Mutex<Option<Connection>>,
}

impl std::fmt::Debug for LocalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStore")
            .field("location", &self.location)
            .finish_non_exhaustive()
    }
}

impl LocalStore {
    /// A store backed by the SQLite file at `path`. Nothing is opened yet.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            location: Location::File(path.as_ref().to_path_buf()),
            conn: Mutex::new(None),
        }
    }

    /// A store that lives only as long as this value.
    pub fn in_memory() -> Self {
        Self {
            location: Location::Memory,
            conn: Mutex::new(None),
        }
    }

    /// Path of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        match &self.location {
            Location::File(path) => Some(path),
            Location::Memory => None,
        }
    }

    /// Acquire the connection if it is not held yet. Safe to call repeatedly.
    pub fn open(&self) -> Result<(), StoreError> {
        self.with_conn(|_| Ok(()))
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        match &self.location {
            Location::File(path) => super::open_database(path),
            Location::Memory => super::open_memory_database(),
        }
    }

    fn with_conn<T>(
        &self,
        op: impl FnOnce(&mut Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        let mut conn = match guard.take() {
            Some(conn) => conn,
            None => self.connect()?,
        };

        let result = op(&mut conn);

        // An in-memory store cannot be re-acquired without losing its data.
        if result.is_ok() || matches!(self.location, Location::Memory) {
            *guard = Some(conn);
        }
        result
    }

    /// Insert or overwrite the entry with the same `id`.
    pub fn put(&self, entry: &DiaryEntry) -> Result<(), StoreError> {
        let tags = entry.tags.as_ref().map(serde_json::to_string).transpose()?;
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO memories (id, title, date, content, tags, image_url) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
                 ON CONFLICT(id) DO UPDATE SET title = excluded.title, date = excluded.date, \
                 content = excluded.content, tags = excluded.tags, image_url = excluded.image_url",
                params![
                    entry.id,
                    entry.title,
                    entry.date,
                    entry.content,
                    tags,
                    entry.image_url,
                ],
            )?;
            tx.commit()?;
            Ok(())
        })
    }

    /// Every stored entry, in store order.
    pub fn get_all(&self) -> Result<Vec<DiaryEntry>, StoreError> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let entries = {
                let mut stmt = tx.prepare(
                    "SELECT id, title, date, content, tags, image_url FROM memories",
                )?;
                let rows = stmt.query_map([], |row| {
                    let tags: Option<String> = row.get(4)?;
                    Ok(DiaryEntry {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        date: row.get(2)?,
                        content: row.get(3)?,
                        tags: tags.and_then(|s| serde_json::from_str(&s).ok()),
                        image_url: row.get(5)?,
                    })
                })?;
                rows.collect::<Result<Vec<_>, _>>()?
            };
            tx.commit()?;
            Ok(entries)
        })
    }

    /// Remove the entry with `id`. Returns whether a row existed; a missing id is not an error.
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let removed = tx.execute("DELETE FROM memories WHERE id = ?1", params![id])?;
            tx.commit()?;
            Ok(removed > 0)
        })
    }

    /// Diagnostics for the `doctor` command.
    pub fn health(&self) -> Result<HealthReport, StoreError> {
        self.with_conn(|conn| super::check_store_health(conn))
    }
}
