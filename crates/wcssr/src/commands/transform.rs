//! Transform a single module.

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::Config;

/// Run the transform command.
pub async fn run(config_path: &Path, file: &Path, jsx: bool) -> Result<()> {
    let config = Config::load(config_path)?;
    let loader = config.loader()?;

    let code = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let id = file.to_string_lossy();

    let Some(output) = loader.transformer().transform(&code, &id).await? else {
        tracing::info!("No library components in {}", file.display());
        println!("{code}");
        return Ok(());
    };

    if jsx {
        for declaration in &output.declarations {
            println!("{}\n", declaration.to_jsx());
        }
    } else {
        println!("{}", output.code);
    }

    Ok(())
}
