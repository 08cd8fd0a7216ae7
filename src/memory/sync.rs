//! Save, list, and delete across the local store and the remote service.
//!
//! The local store is written first and always; once that returns, the entry
//! is durable as far as the user is concerned. The remote is a best-effort
//! mirror: every remote fault is logged and absorbed, and the listing falls
//! back to local data whenever the remote cannot answer. No operation here
//! returns an error.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::policy::{resolve_listing, Listing};
use super::types::DiaryEntry;
use crate::db::{LocalStore, StoreError};
use crate::remote::{RemoteClient, RemoteError};

/// Outcome of the local half of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalWrite {
    Stored,
    Failed(String),
}

/// Outcome of the remote half of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteSync {
    /// The remote is not configured; nothing was sent.
    Unconfigured,
    Synced,
    /// The remote call failed; the local result stands.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub local: LocalWrite,
    pub remote: RemoteSync,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteReport {
    pub local: LocalWrite,
    pub remote: RemoteSync,
}

/// Coordinates the local store and the remote client.
#[derive(Debug, Clone)]
pub struct SyncEngine {
    store: Arc<LocalStore>,
    remote: RemoteClient,
}

impl SyncEngine {
    pub fn new(store: LocalStore, remote: RemoteClient) -> Self {
        Self {
            store: Arc::new(store),
            remote,
        }
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn remote(&self) -> &RemoteClient {
        &self.remote
    }

    /// Run a store operation on the blocking pool.
    async fn on_store<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&LocalStore) -> Result<T, StoreError> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|e| StoreError::Task(e.to_string()))?
    }

    /// Persist `entry` locally, then mirror it remotely if possible.
    pub async fn save(&self, entry: &DiaryEntry) -> SaveReport {
        let to_store = entry.clone();
        let local = match self.on_store(move |store| store.put(&to_store)).await {
            Ok(()) => LocalWrite::Stored,
            Err(e) => {
                error!(id = %entry.id, error = %e, "local save failed");
                LocalWrite::Failed(e.to_string())
            }
        };

        let remote = self.mirror(self.remote.create(entry).await, &entry.id, "save");
        SaveReport { local, remote }
    }

    /// All known entries, deduplicated by id and newest first.
    pub async fn list_all(&self) -> Listing {
        let local = match self.on_store(|store| store.get_all()).await {
            Ok(entries) => entries,
            Err(e) => {
                error!(error = %e, "local read failed, continuing without local entries");
                Vec::new()
            }
        };

        let remote = if self.remote.is_configured() {
            let result = self.remote.list_all().await;
            if let Err(e) = &result {
                info!(error = %e, "remote unavailable, listing local entries");
            }
            Some(result)
        } else {
            debug!("remote not configured, listing local entries");
            None
        };

        resolve_listing(local, remote)
    }

    /// Remove `id` locally, then remotely if possible.
    pub async fn delete(&self, id: &str) -> DeleteReport {
        let owned = id.to_string();
        let local = match self.on_store(move |store| store.delete(&owned)).await {
            Ok(existed) => {
                debug!(id, existed, "local delete done");
                LocalWrite::Stored
            }
            Err(e) => {
                error!(id, error = %e, "local delete failed");
                LocalWrite::Failed(e.to_string())
            }
        };

        let remote = self.mirror(self.remote.delete(id).await, id, "delete");
        DeleteReport { local, remote }
    }

    fn mirror(&self, result: Result<(), RemoteError>, id: &str, op: &str) -> RemoteSync {
        match result {
            Ok(()) => RemoteSync::Synced,
            Err(RemoteError::NotConfigured) => {
                debug!(id, op, "remote not configured, kept local");
                RemoteSync::Unconfigured
            }
            Err(e) => {
                warn!(id, op, error = %e, "remote {op} failed, kept local");
                RemoteSync::Failed(e.to_string())
            }
        }
    }
}
