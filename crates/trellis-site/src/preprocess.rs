//! Markdown preprocessing.
//!
//! Every `.md` file under the Markdown directory is rendered to an HTML
//! fragment and written into the work directory as an intermediate template.
//! The headings of each document are kept so the resolver can attach them to
//! the pages that use the template.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use futures::future::join_all;
use walkdir::WalkDir;

use trellis_md::{render_markdown, HeadingEntry};

use crate::names::intermediate_filename;
use crate::report::{Stage, StageFailure};

/// A converted Markdown source.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkdownDocument {
    /// Markdown file the document was read from
    pub source: PathBuf,

    /// Intermediate template filename
    pub template: String,

    /// Headings in document order
    pub headings: Vec<HeadingEntry>,
}

/// Headings of every converted document, keyed by template filename.
#[derive(Debug, Clone, Default)]
pub struct HeadingIndex {
    entries: HashMap<String, Vec<HeadingEntry>>,
}

impl HeadingIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the headings of a template, replacing any previous entry.
    pub fn insert(&mut self, template: impl Into<String>, headings: Vec<HeadingEntry>) {
        self.entries.insert(template.into(), headings);
    }

    /// Headings recorded for a template.
    pub fn get(&self, template: &str) -> Option<&[HeadingEntry]> {
        self.entries.get(template).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> FromIterator<&'a MarkdownDocument> for HeadingIndex {
    fn from_iter<I: IntoIterator<Item = &'a MarkdownDocument>>(iter: I) -> Self {
        let mut index = Self::new();
        for doc in iter {
            index.insert(doc.template.clone(), doc.headings.clone());
        }
        index
    }
}

/// Outcome of preprocessing a Markdown directory.
#[derive(Debug, Default)]
pub struct PreprocessOutcome {
    /// Documents converted successfully
    pub documents: Vec<MarkdownDocument>,

    /// Files that could not be converted
    pub failures: Vec<StageFailure>,
}

impl PreprocessOutcome {
    /// Build the heading index of the converted documents.
    pub fn heading_index(&self) -> HeadingIndex {
        self.documents.iter().collect()
    }
}

/// Find every `.md` file under `dir`, in file name order, along with any
/// entries the walk could not read.
///
/// A missing directory yields no files.
pub fn discover_markdown(dir: &Path) -> (Vec<PathBuf>, Vec<StageFailure>) {
    let mut sources = Vec::new();
    let mut failures = Vec::new();

    if !dir.exists() {
        return (sources, failures);
    }

    for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(dir).to_path_buf();
                failures.push(StageFailure::new(
                    Stage::Markdown,
                    &path,
                    format!("Failed to scan: {e}"),
                ));
                continue;
            }
        };

        let is_markdown = entry.path().extension().and_then(|ext| ext.to_str()) == Some("md");
        if entry.file_type().is_file() && is_markdown {
            sources.push(entry.into_path());
        }
    }

    (sources, failures)
}

/// Convert every Markdown file under `markdown_dir` into `work_dir`.
pub async fn preprocess_markdown(markdown_dir: &Path, work_dir: &Path) -> PreprocessOutcome {
    let (sources, mut failures) = discover_markdown(markdown_dir);

    if sources.is_empty() {
        tracing::info!("No markdown files found in {}", markdown_dir.display());
        return PreprocessOutcome {
            documents: Vec::new(),
            failures,
        };
    }

    if let Err(e) = tokio::fs::create_dir_all(work_dir).await {
        failures.push(StageFailure::new(
            Stage::Markdown,
            work_dir,
            format!("Failed to create work directory: {e}"),
        ));
        return PreprocessOutcome {
            documents: Vec::new(),
            failures,
        };
    }

    let candidates = assign_templates(sources, &mut failures);

    let results = join_all(
        candidates
            .into_iter()
            .map(|(source, template)| convert_document(source, template, work_dir)),
    )
    .await;

    let mut documents = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(doc) => documents.push(doc),
            Err(failure) => failures.push(failure),
        }
    }

    tracing::info!("Finished: Converting {} markdown files", documents.len());

    PreprocessOutcome {
        documents,
        failures,
    }
}

/// Pair each source with its intermediate filename. When several sources
/// share a filename, the last one in walk order is kept.
fn assign_templates(
    sources: Vec<PathBuf>,
    failures: &mut Vec<StageFailure>,
) -> Vec<(PathBuf, String)> {
    let mut named = Vec::with_capacity(sources.len());

    for source in sources {
        match intermediate_filename(&source) {
            Some(template) => named.push((source, template)),
            None => failures.push(StageFailure::new(
                Stage::Markdown,
                &source,
                "File name is not valid UTF-8",
            )),
        }
    }

    let mut last_seen: HashMap<String, usize> = HashMap::new();
    for (i, (_, template)) in named.iter().enumerate() {
        last_seen.insert(template.clone(), i);
    }

    named
        .into_iter()
        .enumerate()
        .filter_map(|(i, (source, template))| {
            if last_seen.get(&template) == Some(&i) {
                Some((source, template))
            } else {
                tracing::warn!(
                    "Skipping {}: another markdown file also produces {}",
                    source.display(),
                    template
                );
                None
            }
        })
        .collect()
}

async fn convert_document(
    source: PathBuf,
    template: String,
    work_dir: &Path,
) -> Result<MarkdownDocument, StageFailure> {
    let text = tokio::fs::read_to_string(&source)
        .await
        .map_err(|e| StageFailure::new(Stage::Markdown, &source, format!("Failed to read: {e}")))?;

    let rendered = render_markdown(&text);

    let target = work_dir.join(&template);
    tokio::fs::write(&target, rendered.html).await.map_err(|e| {
        StageFailure::new(
            Stage::Markdown,
            &source,
            format!("Failed to write {}: {e}", target.display()),
        )
    })?;

    tracing::debug!("Converted {} -> {}", source.display(), target.display());

    Ok(MarkdownDocument {
        source,
        template,
        headings: rendered.headings,
    })
}
