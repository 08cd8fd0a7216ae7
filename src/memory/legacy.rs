//! One-shot import of diary data from the old flat key-value file.
//!
//! Older builds kept every entry as one JSON array under a single key of a
//! string-valued key-value file. [`migrate_legacy`] moves those entries into the
//! current store through [`SyncEngine::save`] and then clears the key, so the
//! step has nothing to do on any later start.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

use super::sync::{LocalWrite, SyncEngine};
use super::types::DiaryEntry;

/// Key the old builds stored the entry array under.
pub const LEGACY_STORAGE_KEY: &str = "gemini_diary_memories";

#[derive(Debug, Error)]
pub enum LegacyError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("legacy file {path} is not a JSON object: {source}")]
    Format {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// A flat, string-valued key-value file (a JSON object on disk).
#[derive(Debug, Clone)]
pub struct KeyValueFile {
    path: PathBuf,
}

impl KeyValueFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> LegacyError {
        LegacyError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_map(&self) -> Result<Map<String, Value>, LegacyError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(self.io_err(e)),
        };
        if raw.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&raw).map_err(|source| LegacyError::Format {
            path: self.path.clone(),
            source,
        })
    }

    /// Write via a temp file and rename so a crash never leaves half a file.
    fn write_map(&self, map: &Map<String, Value>) -> Result<(), LegacyError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        let json = serde_json::to_string_pretty(map).map_err(|source| LegacyError::Format {
            path: self.path.clone(),
            source,
        })?;
        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, json).map_err(|e| self.io_err(e))?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| self.io_err(e))
    }

    /// The string stored under `key`. Non-string values come back as their JSON text.
    pub fn get(&self, key: &str) -> Result<Option<String>, LegacyError> {
        Ok(self.read_map()?.remove(key).map(|value| match value {
            Value::String(s) => s,
            other => other.to_string(),
        }))
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), LegacyError> {
        let mut map = self.read_map()?;
        map.insert(key.to_string(), Value::String(value.to_string()));
        self.write_map(&map)
    }

    /// Remove `key`. Returns whether it was present; the file is untouched otherwise.
    pub fn remove(&self, key: &str) -> Result<bool, LegacyError> {
        let mut map = self.read_map()?;
        if map.remove(key).is_none() {
            return Ok(false);
        }
        self.write_map(&map)?;
        Ok(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// No legacy data was found.
    NothingToMigrate,
    /// The key was consumed. `skipped` counts items that were not complete
    /// entries (any required field missing or mistyped) or could not be
    /// written locally.
    Migrated { imported: usize, skipped: usize },
    /// The legacy data could not be read at all; the key was left in place.
    Abandoned(String),
}

/// Import legacy entries, then remove the legacy key.
///
/// If the stored value is not valid JSON nothing is imported and the key is
/// kept. Any JSON value clears the key; only arrays contribute entries.
///
/// Each item must deserialize as a complete [`DiaryEntry`]. An object missing a
/// required field (`content`, `imageUrl`, ...) is counted in `skipped` and is
/// not imported.
pub async fn migrate_legacy(engine: &SyncEngine, legacy: &KeyValueFile) -> MigrationOutcome {
    let raw = match legacy.get(LEGACY_STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return MigrationOutcome::NothingToMigrate,
        Err(e) => {
            error!(error = %e, "legacy migration failed");
            return MigrationOutcome::Abandoned(e.to_string());
        }
    };

    let parsed: Value = match serde_json::from_str(&raw) {
        Ok(parsed) => parsed,
        Err(e) => {
            error!(error = %e, "legacy migration failed, legacy data left in place");
            return MigrationOutcome::Abandoned(e.to_string());
        }
    };

    let items = match parsed {
        Value::Array(items) => items,
        other => {
            warn!(kind = %json_kind(&other), "legacy data is not a list, nothing to import");
            Vec::new()
        }
    };

    let mut imported = 0;
    let mut skipped = 0;
    for item in items {
        let entry: DiaryEntry = match serde_json::from_value(item) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable legacy entry");
                skipped += 1;
                continue;
            }
        };
        match engine.save(&entry).await.local {
            LocalWrite::Stored => imported += 1,
            LocalWrite::Failed(_) => skipped += 1,
        }
    }

    if let Err(e) = legacy.remove(LEGACY_STORAGE_KEY) {
        error!(error = %e, "failed to clear legacy key");
    }

    info!(imported, skipped, "legacy diary data migrated");
    MigrationOutcome::Migrated { imported, skipped }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
