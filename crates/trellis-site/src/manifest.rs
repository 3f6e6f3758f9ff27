//! Route manifest loading.
//!
//! The manifest is a JSON object whose keys are path segments. A value is
//! either a page (a template name, or an object with a `file` and optional
//! `layout`) or a nested object describing a subdirectory. The key `"."` names
//! the index page of the directory it appears in.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

/// A page leaf in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRoute {
    /// Template reference, with or without an extension
    pub file: String,

    /// Layout wrapping the page, if any
    pub layout: Option<String>,
}

/// A manifest value.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteNode {
    /// A page
    Page(PageRoute),

    /// A nested output directory
    Section(RouteManifest),
}

/// An ordered mapping of path segments to route nodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteManifest {
    entries: Vec<(String, RouteNode)>,
}

/// Errors that can occur while loading the manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Route manifest not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read route manifest {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Malformed route manifest {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid route '{route}': {reason}")]
    InvalidRoute { route: String, reason: String },
}

impl RouteManifest {
    /// Build a manifest from parsed JSON.
    pub fn from_value(value: &Value) -> Result<Self, ManifestError> {
        match value {
            Value::Object(map) => Self::from_map(map, ""),
            _ => Err(ManifestError::InvalidRoute {
                route: "(root)".to_string(),
                reason: "the manifest must be a JSON object".to_string(),
            }),
        }
    }

    fn from_map(map: &Map<String, Value>, prefix: &str) -> Result<Self, ManifestError> {
        let mut entries = Vec::with_capacity(map.len());

        for (key, value) in map {
            let route = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}/{key}")
            };
            entries.push((key.clone(), parse_node(value, &route)?));
        }

        Ok(Self { entries })
    }

    /// Entries in manifest order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &RouteNode)> {
        self.entries.iter().map(|(key, node)| (key.as_str(), node))
    }

    /// Number of page leaves, counting nested sections.
    pub fn page_count(&self) -> usize {
        self.entries
            .iter()
            .map(|(_, node)| match node {
                RouteNode::Page(_) => 1,
                RouteNode::Section(section) => section.page_count(),
            })
            .sum()
    }
}

fn parse_node(value: &Value, route: &str) -> Result<RouteNode, ManifestError> {
    let invalid = |reason: &str| ManifestError::InvalidRoute {
        route: route.to_string(),
        reason: reason.to_string(),
    };

    match value {
        Value::String(file) if file.is_empty() => Err(invalid("template name is empty")),

        Value::String(file) => Ok(RouteNode::Page(PageRoute {
            file: file.clone(),
            layout: None,
        })),

        Value::Object(map) => match map.get("file") {
            Some(Value::String(file)) => {
                if file.is_empty() {
                    return Err(invalid("template name is empty"));
                }

                let layout = match map.get("layout") {
                    None | Some(Value::Null) => None,
                    Some(Value::String(layout)) => Some(layout.clone()),
                    Some(_) => return Err(invalid("`layout` must be a string")),
                };

                Ok(RouteNode::Page(PageRoute {
                    file: file.clone(),
                    layout,
                }))
            }
            _ => Ok(RouteNode::Section(RouteManifest::from_map(map, route)?)),
        },

        _ => Err(invalid(
            "expected a template name, a page object or a nested route map",
        )),
    }
}

/// Load and validate the route manifest at `path`.
pub fn load_manifest(path: &Path) -> Result<RouteManifest, ManifestError> {
    let content = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ManifestError::NotFound(path.to_path_buf()),
        _ => ManifestError::Read {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let value: Value = serde_json::from_str(&content).map_err(|source| ManifestError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;

    let manifest = RouteManifest::from_value(&value)?;

    tracing::debug!(
        "Loaded {} routes from {}",
        manifest.page_count(),
        path.display()
    );

    Ok(manifest)
}
