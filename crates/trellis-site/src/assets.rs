//! Static asset staging.

use std::io;
use std::path::{Path, PathBuf};

use futures::future::join_all;
use walkdir::WalkDir;

use crate::config::absolute_path;
use crate::report::{Stage, StageFailure};

/// Outcome of staging assets.
#[derive(Debug, Default)]
pub struct AssetOutcome {
    /// Files copied
    pub copied: usize,

    /// Configured paths that did not exist
    pub skipped: Vec<PathBuf>,

    /// Paths that failed to copy
    pub failures: Vec<StageFailure>,
}

/// Copies asset files and directories from the project root into the output
/// directory, keeping their position relative to the root.
pub struct AssetStager<'a> {
    root: &'a Path,
    output_dir: &'a Path,
}

impl<'a> AssetStager<'a> {
    pub fn new(root: &'a Path, output_dir: &'a Path) -> Self {
        Self { root, output_dir }
    }

    /// Where an asset lands in the output tree.
    ///
    /// Assets outside the root have no place in the output and are refused,
    /// as is a destination that lies inside the asset itself.
    pub fn output_path(&self, asset: &Path) -> Result<PathBuf, String> {
        let source = absolute_path(asset).map_err(|e| format!("Cannot resolve path: {e}"))?;
        let root = absolute_path(self.root).map_err(|e| format!("Cannot resolve root: {e}"))?;

        let relative = source.strip_prefix(&root).map_err(|_| {
            format!("Outside the project root {}", self.root.display())
        })?;
        let target = self.output_dir.join(relative);

        let resolved = absolute_path(&target).map_err(|e| format!("Cannot resolve path: {e}"))?;
        if resolved.starts_with(&source) {
            return Err(format!("Destination {} lies inside the asset", target.display()));
        }

        Ok(target)
    }

    /// Copy every existing asset. Missing paths are skipped.
    pub async fn stage(&self, assets: &[PathBuf]) -> AssetOutcome {
        let results = join_all(assets.iter().map(|asset| async move {
            if !tokio::fs::try_exists(asset).await.unwrap_or(false) {
                tracing::debug!("Skipping missing asset {}", asset.display());
                return Ok(None);
            }

            let target = match self.output_path(asset) {
                Ok(target) => target,
                Err(reason) => return Err(StageFailure::new(Stage::Assets, asset, reason)),
            };

            copy_tree(asset, &target)
                .await
                .map(Some)
                .map_err(|e| {
                    StageFailure::new(Stage::Assets, asset, format!("Failed to copy: {e}"))
                })
        }))
        .await;

        let mut outcome = AssetOutcome::default();
        for (asset, result) in assets.iter().zip(results) {
            match result {
                Ok(Some(count)) => outcome.copied += count,
                Ok(None) => outcome.skipped.push(asset.clone()),
                Err(failure) => outcome.failures.push(failure),
            }
        }

        outcome
    }
}

/// Recursively copy a file or directory, returning the number of files copied.
pub async fn copy_tree(src: &Path, dst: &Path) -> io::Result<usize> {
    let metadata = tokio::fs::metadata(src).await?;

    if !metadata.is_dir() {
        if let Some(parent) = dst.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(src, dst).await?;
        return Ok(1);
    }

    let mut files = Vec::new();

    // Directories are yielded before their contents, so each target
    // directory exists before any copy into it starts.
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(io::Error::other)?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            tokio::fs::create_dir_all(&target).await?;
        } else {
            files.push((entry.into_path(), target));
        }
    }

    let copies = join_all(files.iter().map(|(from, to)| tokio::fs::copy(from, to))).await;
    for result in copies {
        result?;
    }

    Ok(files.len())
}
