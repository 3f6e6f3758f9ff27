//! Route resolution.
//!
//! Flattens the nested route manifest into one [`PageJob`] per page leaf.
//! Every page is written as `<dir>/index.html` so that URLs stay clean, and
//! each job carries the `../` prefix that leads from its directory back to the
//! output root.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use trellis_md::HeadingEntry;

use crate::manifest::{PageRoute, RouteManifest, RouteNode};
use crate::names::{strip_extension, template_filename, INDEX_KEY};
use crate::preprocess::HeadingIndex;

/// A page to render.
#[derive(Debug, Clone, PartialEq)]
pub struct PageJob {
    /// Template source inside the work directory
    pub file_path: PathBuf,

    /// Output file, always ending in `index.html`
    pub save_path: PathBuf,

    /// Directory segments between the output root and the page
    pub folders: Vec<String>,

    /// Prefix leading back to the output root (`"../"` per folder)
    pub relative: String,

    /// Layout wrapping the page
    pub layout: Option<String>,

    /// Template filename
    pub file: String,

    /// Manifest route the job came from, e.g. `docs/setup`
    pub route: String,

    /// Headings of the template, empty for hand-authored templates
    pub headings: Vec<HeadingEntry>,
}

/// Errors that can occur while resolving routes.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Routes '{first}' and '{second}' both write to {}", .path.display())]
    DuplicateOutput {
        path: PathBuf,
        first: String,
        second: String,
    },

    #[error("Route '{route}' escapes its directory: {segment}")]
    UnsafePath { route: String, segment: String },
}

/// Flatten a manifest into page jobs.
///
/// Jobs are emitted depth-first in manifest order. Template paths are resolved
/// against `views_dir`, output paths against `output_dir`.
pub fn resolve_routes(
    manifest: &RouteManifest,
    output_dir: &Path,
    views_dir: &Path,
) -> Result<Vec<PageJob>, ResolveError> {
    let resolver = Resolver {
        output_dir,
        views_dir,
    };

    let mut jobs = Vec::with_capacity(manifest.page_count());
    resolver.flatten(manifest, &[], "", &mut jobs)?;

    check_unique_outputs(&jobs)?;

    Ok(jobs)
}

/// Attach the headings of each job's template. Templates without an index
/// entry get an empty list.
pub fn attach_headings(jobs: &mut [PageJob], index: &HeadingIndex) {
    for job in jobs {
        job.headings = index.get(&job.file).map(<[_]>::to_vec).unwrap_or_default();
    }
}

struct Resolver<'a> {
    output_dir: &'a Path,
    views_dir: &'a Path,
}

impl Resolver<'_> {
    fn flatten(
        &self,
        manifest: &RouteManifest,
        breadcrumb: &[String],
        prefix: &str,
        jobs: &mut Vec<PageJob>,
    ) -> Result<(), ResolveError> {
        for (key, node) in manifest.entries() {
            let route = if prefix.is_empty() {
                key.to_string()
            } else {
                format!("{prefix}/{key}")
            };

            match node {
                RouteNode::Page(page) => {
                    jobs.push(self.page_job(key, page, breadcrumb, route)?);
                }
                RouteNode::Section(section) => {
                    let mut nested = breadcrumb.to_vec();
                    if key != INDEX_KEY {
                        nested.extend(segments(key, &route)?);
                    }
                    self.flatten(section, &nested, &route, jobs)?;
                }
            }
        }

        Ok(())
    }

    fn page_job(
        &self,
        key: &str,
        page: &PageRoute,
        breadcrumb: &[String],
        route: String,
    ) -> Result<PageJob, ResolveError> {
        let file = template_filename(&page.file);
        // Validates the template path even for index pages.
        let page_segments = segments(strip_extension(&file), &route)?;

        let mut folders = breadcrumb.to_vec();
        if key != INDEX_KEY {
            folders.extend(page_segments);
        }

        let mut save_path = self.output_dir.to_path_buf();
        save_path.extend(&folders);
        save_path.push("index.html");

        Ok(PageJob {
            file_path: self.views_dir.join(&file),
            save_path,
            relative: "../".repeat(folders.len()),
            folders,
            layout: page.layout.clone(),
            file,
            route,
            headings: Vec::new(),
        })
    }
}

/// Split a key or template name into directory segments, rejecting anything
/// that would leave the output or views directory.
fn segments(value: &str, route: &str) -> Result<Vec<String>, ResolveError> {
    let mut parts = Vec::new();

    for component in Path::new(value).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(ResolveError::UnsafePath {
                    route: route.to_string(),
                    segment: value.to_string(),
                });
            }
        }
    }

    Ok(parts)
}

fn check_unique_outputs(jobs: &[PageJob]) -> Result<(), ResolveError> {
    let mut seen: HashMap<&Path, &str> = HashMap::with_capacity(jobs.len());

    for job in jobs {
        if let Some(first) = seen.insert(&job.save_path, &job.route) {
            return Err(ResolveError::DuplicateOutput {
                path: job.save_path.clone(),
                first: first.to_string(),
                second: job.route.clone(),
            });
        }
    }

    Ok(())
}
