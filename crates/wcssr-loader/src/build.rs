//! Transforming a directory of compiled modules.

use std::path::{Path, PathBuf};
use std::time::Instant;

use walkdir::WalkDir;

use crate::loader::{Loader, LoaderError};

/// Result of a directory build.
#[derive(Debug, Clone, Default)]
pub struct BuildSummary {
    /// Files written with a transform applied
    pub transformed: usize,

    /// Files copied unchanged
    pub copied: usize,

    pub duration_ms: u128,
}

/// Transform every handled file under `src` into `out`, keeping the
/// relative layout. Other files are copied as-is.
pub async fn build_directory(
    loader: &Loader,
    src: &Path,
    out: &Path,
) -> Result<BuildSummary, LoaderError> {
    let start = Instant::now();
    let mut summary = BuildSummary::default();

    for entry in WalkDir::new(src)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        if path.starts_with(out) {
            continue;
        }
        if build_file(loader, src, out, path).await? {
            summary.transformed += 1;
        } else {
            summary.copied += 1;
        }
    }

    summary.duration_ms = start.elapsed().as_millis();
    Ok(summary)
}

/// Transform or copy one file. Returns whether a transform was applied.
pub async fn build_file(
    loader: &Loader,
    src: &Path,
    out: &Path,
    path: &Path,
) -> Result<bool, LoaderError> {
    let target = output_path(src, out, path);
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| io_error(parent, source))?;
    }

    match loader.load_file(path).await? {
        Some(code) => {
            tokio::fs::write(&target, code)
                .await
                .map_err(|source| io_error(&target, source))?;
            tracing::debug!("Transformed {}", path.display());
            Ok(true)
        }
        None => {
            tokio::fs::copy(path, &target)
                .await
                .map_err(|source| io_error(&target, source))?;
            Ok(false)
        }
    }
}

/// Remove the output for a deleted source file.
pub async fn remove_output(src: &Path, out: &Path, path: &Path) -> Result<(), LoaderError> {
    let target = output_path(src, out, path);
    match tokio::fs::remove_file(&target).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(io_error(&target, source)),
    }
}

fn output_path(src: &Path, out: &Path, path: &Path) -> PathBuf {
    let relative = path.strip_prefix(src).unwrap_or(path);
    out.join(relative)
}

fn io_error(path: &Path, source: std::io::Error) -> LoaderError {
    LoaderError::Io {
        path: path.to_path_buf(),
        source,
    }
}
