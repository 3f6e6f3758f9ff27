//! Staging area for intermediate templates.
//!
//! Hand-authored views and converted Markdown fragments are merged into one
//! directory that the template engine loads from.

use std::io;
use std::path::{Path, PathBuf};

use crate::assets::copy_tree;
use crate::config::absolute_path;

/// The intermediate template directory.
#[derive(Debug, Clone)]
pub struct WorkDir {
    path: PathBuf,
}

impl WorkDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check that the directory can be purged and written without touching
    /// project sources or the site output.
    ///
    /// Paths are compared after resolving them against the current
    /// directory, so `..` or an absolute spelling of an ancestor is caught.
    pub fn validate(&self, root: &Path, output_dir: &Path) -> Result<(), String> {
        if self.path.as_os_str().is_empty() {
            return Err("no path given".to_string());
        }

        let resolve = |path: &Path| {
            absolute_path(path)
                .map_err(|e| format!("cannot resolve {}: {e}", path.display()))
        };
        let work = resolve(self.path.as_path())?;
        let cwd = resolve(Path::new("."))?;
        let root = resolve(root)?;
        let output = resolve(output_dir)?;

        if cwd.starts_with(&work) {
            return Err(format!("it contains the current directory {}", cwd.display()));
        }
        if root.starts_with(&work) {
            return Err(format!("it contains the project root {}", root.display()));
        }
        if output.starts_with(&work) || work.starts_with(&output) {
            return Err(format!(
                "it overlaps the output directory {}",
                output_dir.display()
            ));
        }
        Ok(())
    }

    /// Create the directory, first removing any previous contents when
    /// `clean` is set.
    pub async fn acquire(&self, clean: bool) -> io::Result<()> {
        if clean && tokio::fs::try_exists(&self.path).await? {
            tracing::debug!("Purging {}", self.path.display());
            tokio::fs::remove_dir_all(&self.path).await?;
        }
        tokio::fs::create_dir_all(&self.path).await
    }

    /// Copy hand-authored views into the directory. A missing views
    /// directory copies nothing.
    pub async fn stage_views(&self, views_dir: &Path) -> io::Result<usize> {
        if !tokio::fs::try_exists(views_dir).await? {
            tracing::debug!("No views directory at {}", views_dir.display());
            return Ok(0);
        }
        copy_tree(views_dir, &self.path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn rejects_unsafe_locations() {
        let root = Path::new("src");
        let out = Path::new("dist");

        assert!(WorkDir::new(".").validate(root, out).is_err());
        assert!(WorkDir::new("").validate(root, out).is_err());
        assert!(WorkDir::new("src").validate(root, out).is_err());
        assert!(WorkDir::new("dist").validate(root, out).is_err());
        assert!(WorkDir::new("dist/tmp").validate(root, out).is_err());
        assert!(WorkDir::new("./tmp").validate(root, out).is_ok());
        assert!(WorkDir::new("tmp").validate(root, out).is_ok());
    }

    #[test]
    fn rejects_ancestors_of_the_project() {
        let root = Path::new("src");
        let out = Path::new("dist");
        let cwd = std::env::current_dir().unwrap();

        assert!(WorkDir::new("..").validate(root, out).is_err());
        assert!(WorkDir::new("src/..").validate(root, out).is_err());
        assert!(WorkDir::new(&cwd).validate(root, out).is_err());
        assert!(WorkDir::new(cwd.parent().unwrap()).validate(root, out).is_err());

        let name = cwd.file_name().unwrap();
        let sibling_spelling = Path::new("..").join(name);
        assert!(WorkDir::new(sibling_spelling).validate(root, out).is_err());
    }

    #[test]
    fn rejects_absolute_parents_of_root_and_output() {
        let temp = tempdir().unwrap();
        let site = temp.path().join("site");
        let root = site.join("src");
        let out = temp.path().join("public");

        assert!(WorkDir::new(&site).validate(&root, &out).is_err());
        assert!(WorkDir::new(temp.path()).validate(&root, &out).is_err());
        assert!(WorkDir::new(out.join("cache")).validate(&root, &out).is_err());
        assert!(WorkDir::new(temp.path().join("tmp")).validate(&root, &out).is_ok());
    }

    #[tokio::test]
    async fn acquire_purges_stale_templates() {
        let temp = tempdir().unwrap();
        let work = WorkDir::new(temp.path().join("tmp"));
        fs::create_dir_all(work.path()).unwrap();
        fs::write(work.path().join("stale.html"), "old").unwrap();

        work.acquire(true).await.unwrap();

        assert!(work.path().exists());
        assert!(!work.path().join("stale.html").exists());
    }

    #[tokio::test]
    async fn acquire_without_clean_keeps_contents() {
        let temp = tempdir().unwrap();
        let work = WorkDir::new(temp.path().join("tmp"));
        fs::create_dir_all(work.path()).unwrap();
        fs::write(work.path().join("kept.html"), "old").unwrap();

        work.acquire(false).await.unwrap();

        assert!(work.path().join("kept.html").exists());
    }

    #[tokio::test]
    async fn stages_views_recursively() {
        let temp = tempdir().unwrap();
        let views = temp.path().join("views");
        fs::create_dir_all(views.join("partials")).unwrap();
        fs::write(views.join("layout.html"), "{{ body }}").unwrap();
        fs::write(views.join("partials/nav.html"), "<nav></nav>").unwrap();
        let work = WorkDir::new(temp.path().join("tmp"));
        work.acquire(true).await.unwrap();

        let copied = work.stage_views(&views).await.unwrap();

        assert_eq!(copied, 2);
        assert!(work.path().join("partials/nav.html").exists());
    }

    #[tokio::test]
    async fn missing_views_are_skipped() {
        let temp = tempdir().unwrap();
        let work = WorkDir::new(temp.path().join("tmp"));

        let copied = work.stage_views(&temp.path().join("views")).await.unwrap();

        assert_eq!(copied, 0);
    }
}
