//! Legacy import, run once at startup and available as the `migrate` command.

use reverie::config::ReverieConfig;
use reverie::memory::legacy::{migrate_legacy, KeyValueFile, MigrationOutcome};
use reverie::memory::sync::SyncEngine;

/// Startup hook: import quietly, the outcome is already logged.
pub async fn run_startup(engine: &SyncEngine, config: &ReverieConfig) {
    let legacy = KeyValueFile::new(config.resolved_legacy_path());
    migrate_legacy(engine, &legacy).await;
}

pub async fn migrate(engine: &SyncEngine, config: &ReverieConfig) {
    let legacy = KeyValueFile::new(config.resolved_legacy_path());
    match migrate_legacy(engine, &legacy).await {
        MigrationOutcome::NothingToMigrate => {
            println!("No legacy data at {}", legacy.path().display());
        }
        MigrationOutcome::Migrated { imported, skipped } => {
            println!("Legacy import complete:");
            println!("  Entries imported: {imported}");
            if skipped > 0 {
                println!("  Entries skipped:  {skipped}");
            }
        }
        MigrationOutcome::Abandoned(reason) => {
            println!("Legacy import abandoned: {reason}");
            println!("The legacy data was left in place at {}", legacy.path().display());
        }
    }
}
