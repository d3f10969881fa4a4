//! Directory build command.

use std::path::Path;

use anyhow::Result;
use wcssr_loader::build_directory;

use crate::config::Config;

/// Run the build command.
pub async fn run(config_path: &Path, src: &Path, out: &Path) -> Result<()> {
    tracing::info!("Building {}...", src.display());

    let config = Config::load(config_path)?;
    let loader = config.loader()?;

    let summary = build_directory(&loader, src, out).await?;

    tracing::info!(
        "Transformed {} modules, copied {} files in {}ms",
        summary.transformed,
        summary.copied,
        summary.duration_ms
    );
    tracing::info!("Output: {}", out.display());

    Ok(())
}
