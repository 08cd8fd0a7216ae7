use reverie::memory::sync::SyncEngine;

/// Delete an entry everywhere it can be reached.
pub async fn delete(engine: &SyncEngine, id: &str) {
    let report = engine.delete(id).await;
    println!("Deleted {id}");
    println!("  Local:  {}", super::describe_local(&report.local));
    println!("  Remote: {}", super::describe_remote(&report.remote));
}
