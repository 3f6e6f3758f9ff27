//! Project path resolution.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Project paths as written by the user.
///
/// `views`, `markdown`, `assets` and `routes` are relative to `root`; `output`
/// and `work_dir` are relative to the working directory.
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    /// Project source root
    pub root: PathBuf,

    /// Hand-authored templates and layouts
    pub views: PathBuf,

    /// Markdown sources
    pub markdown: PathBuf,

    /// Static files and directories copied verbatim
    pub assets: Vec<PathBuf>,

    /// Route manifest
    pub routes: PathBuf,

    /// Output directory
    pub output: PathBuf,

    /// Staging area for intermediate templates
    pub work_dir: PathBuf,

    /// Site title
    pub title: String,

    /// Purge the staging area before each build
    pub clean_work_dir: bool,
}

impl Default for ProjectPaths {
    fn default() -> Self {
        Self {
            root: PathBuf::from("src"),
            views: PathBuf::from("views"),
            markdown: PathBuf::from("markdown"),
            assets: vec![],
            routes: PathBuf::from("routes.json"),
            output: PathBuf::from("dist"),
            work_dir: PathBuf::from("tmp"),
            title: String::new(),
            clean_work_dir: true,
        }
    }
}

/// Fully resolved configuration for a build.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Project source root
    pub root: PathBuf,

    /// Hand-authored templates directory
    pub views_dir: PathBuf,

    /// Markdown source directory
    pub markdown_dir: PathBuf,

    /// Asset paths, already joined onto the root
    pub assets: Vec<PathBuf>,

    /// Route manifest file
    pub routes_file: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Intermediate template directory
    pub work_dir: PathBuf,

    /// Site title
    pub title: String,

    /// Purge the work directory before each build
    pub clean_work_dir: bool,
}

impl BuildConfig {
    /// Join and normalize project paths. This is the only place paths are
    /// rewritten; every stage works with the result as-is.
    pub fn resolve(paths: ProjectPaths) -> Self {
        let root = normalize_path(&paths.root);

        Self {
            views_dir: normalize_path(&root.join(&paths.views)),
            markdown_dir: normalize_path(&root.join(&paths.markdown)),
            assets: paths
                .assets
                .iter()
                .map(|asset| normalize_path(&root.join(asset)))
                .collect(),
            routes_file: normalize_path(&root.join(&paths.routes)),
            output_dir: normalize_path(&paths.output),
            work_dir: normalize_path(&paths.work_dir),
            title: paths.title,
            clean_work_dir: paths.clean_work_dir,
            root,
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self::resolve(ProjectPaths::default())
    }
}

/// Lexically normalize a path: `.` components are dropped and `..` folds into
/// a preceding normal component. An empty result becomes `.`.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }

    parts.iter().collect()
}

/// Resolve a path against the current directory and normalize it, without
/// touching the file system.
pub fn absolute_path(path: &Path) -> io::Result<PathBuf> {
    Ok(normalize_path(&std::path::absolute(path)?))
}
