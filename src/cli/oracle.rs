use anyhow::{Context, Result};

use reverie::config::ReverieConfig;
use reverie::oracle::OracleClient;

/// Look up a report by access code and print it.
pub async fn oracle(config: &ReverieConfig, code: &str) -> Result<()> {
    let client =
        OracleClient::new(config.oracle.clone()).context("failed to create oracle client")?;

    match client.lookup(code).await {
        Some(entry) => {
            println!("{}", entry.title);
            println!("{}", entry.date);
            println!("{}", "-".repeat(40));
            println!("{}", entry.content);
            println!();
            println!("tags: {}", entry.tags().join(", "));
        }
        None => println!("No report for code {code}"),
    }
    Ok(())
}
