pub mod delete;
pub mod doctor;
pub mod list;
pub mod migrate;
pub mod oracle;
pub mod save;

use anyhow::{Context, Result};

use reverie::config::ReverieConfig;
use reverie::db::LocalStore;
use reverie::memory::sync::{LocalWrite, RemoteSync, SyncEngine};
use reverie::remote::RemoteClient;

/// Wire the local store and remote client from config. Nothing is opened yet.
pub fn build_engine(config: &ReverieConfig) -> Result<SyncEngine> {
    let store = LocalStore::new(config.resolved_db_path());
    let remote =
        RemoteClient::new(config.remote.clone()).context("failed to create remote client")?;
    Ok(SyncEngine::new(store, remote))
}

fn describe_local(local: &LocalWrite) -> String {
    match local {
        LocalWrite::Stored => "ok".into(),
        LocalWrite::Failed(reason) => format!("FAILED ({reason})"),
    }
}

fn describe_remote(remote: &RemoteSync) -> String {
    match remote {
        RemoteSync::Unconfigured => "not configured (kept local)".into(),
        RemoteSync::Synced => "synced".into(),
        RemoteSync::Failed(reason) => format!("not synced ({reason})"),
    }
}
