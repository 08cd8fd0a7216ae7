#![allow(dead_code)]

use reverie::config::RemoteConfig;
use reverie::db::LocalStore;
use reverie::memory::sync::SyncEngine;
use reverie::memory::types::DiaryEntry;
use reverie::remote::wire::to_wire_format;
use reverie::remote::RemoteClient;

/// A port nothing listens on; connections are refused immediately.
pub const UNREACHABLE: &str = "http://127.0.0.1:9";

pub fn entry(id: &str, title: &str, date: &str) -> DiaryEntry {
    DiaryEntry {
        id: id.into(),
        title: title.into(),
        date: date.into(),
        content: format!("{title} content"),
        tags: Some(vec!["test".into()]),
        image_url: format!("https://img.example.com/{id}.jpg"),
    }
}

/// Remote settings pointing at `base_url`, with one-second timeouts.
pub fn remote_config(base_url: &str) -> RemoteConfig {
    RemoteConfig {
        base_url: base_url.into(),
        create_timeout_secs: 1,
        list_timeout_secs: 1,
        delete_timeout_secs: 1,
        ..RemoteConfig::default()
    }
}

/// Engine over a fresh in-memory store with the given remote settings.
pub fn engine(remote: RemoteConfig) -> SyncEngine {
    SyncEngine::new(LocalStore::in_memory(), RemoteClient::new(remote).unwrap())
}

/// Engine whose remote is the shipped placeholder (unconfigured).
pub fn offline_engine() -> SyncEngine {
    engine(RemoteConfig::default())
}

/// The record the remote service would return for `entry`.
pub fn remote_record(entry: &DiaryEntry) -> serde_json::Value {
    let payload = to_wire_format(entry).unwrap();
    serde_json::json!({
        "id": entry.id,
        "image_url": payload.image_url,
        "conversations": payload.conversations,
        "created_at": "2024-05-01T10:00:00Z",
    })
}
