//! Watch mode.

use std::path::{Path, PathBuf};

use anyhow::Result;
use wcssr_loader::{build_directory, build_file, remove_output, FileWatcher, WatchEvent};

use crate::config::Config;

/// Run the watch command.
pub async fn run(config_path: &Path, src: PathBuf, out: PathBuf) -> Result<()> {
    let config = Config::load(config_path)?;
    let loader = config.loader()?;

    // notify reports absolute paths
    tokio::fs::create_dir_all(&out).await?;
    let src = src.canonicalize()?;
    let out = out.canonicalize()?;

    let summary = build_directory(&loader, &src, &out).await?;
    tracing::info!(
        "Transformed {} modules in {}ms",
        summary.transformed,
        summary.duration_ms
    );

    let (_watcher, mut events) =
        FileWatcher::new(&[src.clone()], config.file.ssr.extensions.clone())?;
    tracing::info!("Watching {} for changes", src.display());

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                match event {
                    WatchEvent::Changed(path) => {
                        if path.starts_with(&out) {
                            continue;
                        }
                        match build_file(&loader, &src, &out, &path).await {
                            Ok(true) => tracing::info!("Transformed {}", path.display()),
                            Ok(false) => tracing::debug!("Copied {}", path.display()),
                            Err(e) => tracing::error!("{}", e),
                        }
                    }
                    WatchEvent::Removed(path) => {
                        if let Err(e) = remove_output(&src, &out, &path).await {
                            tracing::error!("{}", e);
                        }
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Stopping watcher");
                break;
            }
        }
    }

    Ok(())
}
