//! Render command handler

use anyhow::Context;
use tracing::info;

use crate::config::Config;
use crate::render::render_page;
use crate::store::DocumentStore;

pub async fn cmd_render(config: &Config) -> anyhow::Result<()> {
    let store = DocumentStore::new(config.data_path());
    let document = store.load().await?;

    let html = render_page(document.items(), config);
    let output = config.output_path();

    tokio::fs::write(output, html)
        .await
        .with_context(|| format!("Failed to write gallery: {}", output.display()))?;

    info!(
        event = "render_finished",
        records = document.items().len(),
        path = %output.display(),
        "Gallery rendered"
    );

    println!("✓ {} built", output.display());

    Ok(())
}
