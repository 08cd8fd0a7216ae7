//! CLI `doctor` command: run store diagnostics and print a health report.

use anyhow::{Context, Result};

use reverie::config::ReverieConfig;
use reverie::memory::sync::SyncEngine;

/// Run store diagnostics and print a health report.
pub fn doctor(engine: &SyncEngine, config: &ReverieConfig) -> Result<()> {
    let db_path = config.resolved_db_path();
    let file_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    let report = engine
        .store()
        .health()
        .context("failed to open store (may be corrupt)")?;

    println!("Reverie Health Report");
    println!("=====================");
    println!();
    println!("Store:             {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!("Store version:     {}", report.store_version);
    println!("Entries:           {}", report.entry_count);
    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
    }
    println!();

    let legacy_path = config.resolved_legacy_path();
    println!("Legacy file:       {}", legacy_path.display());
    println!();

    if engine.remote().is_configured() {
        println!("Remote:            {}", engine.remote().base_url());
    } else {
        println!("Remote:            not configured (entries stay local)");
    }

    let oracle = &config.oracle;
    println!(
        "Oracle proxy:      {}",
        oracle.proxy_url.as_deref().unwrap_or("(not set)")
    );
    println!(
        "Oracle registry:   {}",
        match (&oracle.registry_url, &oracle.registry_key) {
            (Some(url), Some(_)) => url.as_str(),
            (Some(_), None) => "(key missing)",
            _ => "(not set)",
        }
    );

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
