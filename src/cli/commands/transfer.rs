//! Export and import command handlers

use anyhow::Context;
use std::path::Path;

use crate::config::Config;
use crate::services::ContentDocument;
use crate::state::SharedState;

pub async fn cmd_export(config: Config, path: &Path) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;

    let document = state.content_service.export().await?;
    let json = serde_json::to_string_pretty(&document)?;

    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write export file: {}", path.display()))?;

    println!(
        "Exported {} sections to {}",
        document.content.len(),
        path.display()
    );
    Ok(())
}

pub async fn cmd_import(config: Config, path: &Path) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read import file: {}", path.display()))?;
    let document: ContentDocument = serde_json::from_str(&raw)
        .with_context(|| format!("Not a content export: {}", path.display()))?;

    let state = SharedState::new(config).await?;
    let summary = state.content_service.import(&document).await?;

    println!(
        "Imported {} fields ({} failed) from {}",
        summary.updated,
        summary.failed,
        path.display()
    );
    Ok(())
}
