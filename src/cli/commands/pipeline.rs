//! Runs collect, refresh and render back to back.

use crate::config::Config;

use super::{cmd_collect, cmd_refresh, cmd_render};

pub async fn cmd_pipeline(config: &Config) -> anyhow::Result<()> {
    let summary = cmd_collect(config).await?;

    if !summary.written {
        return Ok(());
    }

    cmd_refresh(config).await?;
    cmd_render(config).await
}
