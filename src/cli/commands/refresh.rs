//! Refresh command handler

use crate::clients::BangumiClient;
use crate::config::Config;
use crate::services::Refresher;
use crate::store::DocumentStore;

pub async fn cmd_refresh(config: &Config) -> anyhow::Result<()> {
    let client = BangumiClient::new(&config.catalog)?;
    let refresher = Refresher::new(client, &config.refresher)?;
    let store = DocumentStore::new(config.data_path());

    let outcome = refresher.run(&store).await?;
    let stats = outcome.stats;

    println!();
    println!("{:-<70}", "");
    println!("Refresh complete!");
    println!("  Records:   {}", outcome.total);
    println!("  Refreshed: {}", stats.refreshed);
    println!("  Unchanged: {}", stats.unchanged);
    println!("  Skipped:   {}", stats.skipped);
    println!("  Failed:    {}", stats.failed);
    println!("  Last updated: {}", outcome.last_updated);

    Ok(())
}
