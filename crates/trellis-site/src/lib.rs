//! Route resolution and page assembly for trellis static sites.
//!
//! A build converts Markdown sources into intermediate templates, flattens the
//! JSON route manifest into page jobs, renders each job through its layout and
//! copies static assets into the output tree.

pub mod assembler;
pub mod assets;
pub mod builder;
pub mod config;
pub mod manifest;
pub mod names;
pub mod preprocess;
pub mod report;
pub mod resolver;
pub mod templates;
pub mod workdir;

pub use assembler::{page_title, PageAssembler, PageError};
pub use assets::{copy_tree, AssetStager};
pub use builder::{BuildError, SiteBuilder};
pub use config::{BuildConfig, ProjectPaths};
pub use manifest::{load_manifest, ManifestError, PageRoute, RouteManifest, RouteNode};
pub use preprocess::{preprocess_markdown, HeadingIndex, MarkdownDocument};
pub use report::{BuildReport, Stage, StageFailure};
pub use resolver::{attach_headings, resolve_routes, PageJob, ResolveError};
pub use templates::{PageParams, TemplateEngine};
pub use workdir::WorkDir;
