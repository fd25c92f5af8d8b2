//! Collect command handler

use crate::clients::BangumiClient;
use crate::config::Config;
use crate::services::{CollectSummary, Collector};
use crate::store::DocumentStore;

pub async fn cmd_collect(config: &Config) -> anyhow::Result<CollectSummary> {
    let client = BangumiClient::new(&config.catalog)?;
    let collector = Collector::new(client, &config.collector);
    let store = DocumentStore::new(config.data_path());

    println!("Searching tags: {}", config.collector.tags.join(", "));

    let summary = collector.run(&store).await?;

    if !summary.written {
        println!("No matching anime found, nothing written.");
        return Ok(summary);
    }

    println!();
    println!("{:-<70}", "");
    println!("Collection complete!");
    println!("  Discovered: {}", summary.discovered);
    println!("  Collected:  {}", summary.collected);
    println!("  Written to: {}", store.path().display());

    Ok(summary)
}
