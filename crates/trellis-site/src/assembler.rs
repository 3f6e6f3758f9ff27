//! Page assembly.

use std::io;
use std::path::PathBuf;

use futures::future::join_all;

use crate::report::{Stage, StageFailure};
use crate::resolver::PageJob;
use crate::templates::{PageParams, TemplateEngine};

/// Errors that can occur while assembling a single page.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("Failed to read template {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to render {file}: {message}")]
    Render { file: String, message: String },

    #[error("Failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Outcome of assembling a batch of pages.
#[derive(Debug, Default)]
pub struct AssemblyOutcome {
    /// Pages written
    pub written: Vec<PathBuf>,

    /// Pages that failed, keyed by output path
    pub failures: Vec<StageFailure>,
}

/// Renders page jobs and writes them to disk.
pub struct PageAssembler<'a> {
    engine: &'a TemplateEngine,
    site_title: &'a str,
}

impl<'a> PageAssembler<'a> {
    pub fn new(engine: &'a TemplateEngine, site_title: &'a str) -> Self {
        Self { engine, site_title }
    }

    /// Assemble every job. A failing page does not stop the others.
    pub async fn assemble_all(&self, jobs: &[PageJob]) -> AssemblyOutcome {
        let results = join_all(jobs.iter().map(|job| async move {
            self.assemble(job)
                .await
                .map(|()| job.save_path.clone())
                .map_err(|e| StageFailure::new(Stage::Pages, &job.save_path, e.to_string()))
        }))
        .await;

        let mut outcome = AssemblyOutcome::default();
        for result in results {
            match result {
                Ok(path) => outcome.written.push(path),
                Err(failure) => outcome.failures.push(failure),
            }
        }

        outcome
    }

    /// Render one job and write it to its save path.
    pub async fn assemble(&self, job: &PageJob) -> Result<(), PageError> {
        let params = PageParams {
            title: page_title(self.site_title, &job.folders),
            relative: job.relative.clone(),
            headings: job.headings.clone(),
        };

        let source = tokio::fs::read_to_string(&job.file_path)
            .await
            .map_err(|source| PageError::Read {
                path: job.file_path.clone(),
                source,
            })?;

        let rendered = match &job.layout {
            None => self.engine.render_page(&job.file, &source, &params),
            Some(layout) => self
                .engine
                .render_with_layout(layout, &job.file, &source, &params),
        };

        let html = rendered.map_err(|e| PageError::Render {
            file: job.file.clone(),
            message: e.to_string(),
        })?;

        if let Some(parent) = job.save_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| PageError::Write {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        tokio::fs::write(&job.save_path, html)
            .await
            .map_err(|source| PageError::Write {
                path: job.save_path.clone(),
                source,
            })?;

        tracing::debug!("Wrote {}", job.save_path.display());

        Ok(())
    }
}

/// Build a page title from the site title and the page's folders.
///
/// Each part is capitalized and its first hyphen becomes a space; later
/// hyphens are kept.
pub fn page_title(site_title: &str, folders: &[String]) -> String {
    std::iter::once(site_title)
        .chain(folders.iter().map(String::as_str))
        .map(|part| capitalize(part).replacen('-', " ", 1))
        .collect::<Vec<_>>()
        .join(" - ")
}

/// Capitalize first letter of a string.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
