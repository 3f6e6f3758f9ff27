//! Build outcome reporting.

use std::fmt;
use std::path::{Path, PathBuf};

/// Pipeline stage a failure was recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Views,
    Markdown,
    Pages,
    Assets,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Views => "views",
            Stage::Markdown => "markdown",
            Stage::Pages => "pages",
            Stage::Assets => "assets",
        };
        f.write_str(name)
    }
}

/// A single item that failed without stopping the rest of its stage.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("[{stage}] {}: {message}", .path.display())]
pub struct StageFailure {
    /// Stage the item belonged to
    pub stage: Stage,

    /// Output or source path identifying the item
    pub path: PathBuf,

    /// Error description
    pub message: String,
}

impl StageFailure {
    pub fn new(stage: Stage, path: &Path, message: impl Into<String>) -> Self {
        Self {
            stage,
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

/// Result of a build run.
#[derive(Debug)]
pub struct BuildReport {
    /// Markdown documents converted
    pub documents: usize,

    /// Pages written
    pub pages: usize,

    /// Asset files copied
    pub assets: usize,

    /// Items that failed
    pub failures: Vec<StageFailure>,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

impl BuildReport {
    /// Whether every item in every stage succeeded.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}
