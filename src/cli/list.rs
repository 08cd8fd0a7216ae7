use anyhow::Result;

use reverie::memory::policy::ListingSource;
use reverie::memory::sync::SyncEngine;

/// Print the merged listing.
pub async fn list(engine: &SyncEngine, json: bool) -> Result<()> {
    let listing = engine.list_all().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&listing.entries)?);
        return Ok(());
    }

    for entry in &listing.entries {
        println!("{}  {:<12} {}", entry.id, entry.date, entry.title);
        if !entry.tags().is_empty() {
            println!("    tags: {}", entry.tags().join(", "));
        }
    }

    let source = match &listing.source {
        ListingSource::LocalOnly => "local store".to_string(),
        ListingSource::Merged { remote_count } => {
            format!("local store + {remote_count} remote")
        }
        ListingSource::RemoteUnavailable(reason) => {
            format!("local store (remote unavailable: {reason})")
        }
    };
    eprintln!("{} entries from {source}.", listing.entries.len());
    Ok(())
}
