//! CLI `save` command: store one diary entry.

use anyhow::{bail, Context, Result};
use clap::Args;
use std::path::PathBuf;

use reverie::memory::sync::{LocalWrite, SyncEngine};
use reverie::memory::types::{today, DiaryEntry};

#[derive(Args)]
pub struct SaveArgs {
    /// Entry id (defaults to the current time in epoch milliseconds)
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long)]
    pub title: String,
    /// Display date (defaults to today)
    #[arg(long)]
    pub date: Option<String>,
    /// Entry text; use --content-file for multi-line text
    #[arg(long, conflicts_with = "content_file")]
    pub content: Option<String>,
    #[arg(long)]
    pub content_file: Option<PathBuf>,
    /// Tag to attach; repeat for several
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    /// Image URL or data: URI
    #[arg(long, default_value = "")]
    pub image: String,
}

pub async fn save(engine: &SyncEngine, args: SaveArgs) -> Result<()> {
    let content = match (&args.content, &args.content_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => String::new(),
    };

    let entry = DiaryEntry {
        id: args
            .id
            .unwrap_or_else(|| chrono::Utc::now().timestamp_millis().to_string()),
        title: args.title,
        date: args.date.unwrap_or_else(today),
        content,
        tags: (!args.tags.is_empty()).then_some(args.tags),
        image_url: args.image,
    };

    let report = engine.save(&entry).await;
    println!("Saved {}", entry.id);
    println!("  Local:  {}", super::describe_local(&report.local));
    println!("  Remote: {}", super::describe_remote(&report.remote));

    if let LocalWrite::Failed(reason) = report.local {
        bail!("entry was not stored locally: {reason}");
    }
    Ok(())
}
