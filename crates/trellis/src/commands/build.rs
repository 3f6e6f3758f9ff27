//! Static site build command.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use trellis_site::{BuildConfig, ProjectPaths, SiteBuilder};

/// Configuration file structure (trellis.toml).
#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    site: SiteSettings,
    #[serde(default)]
    paths: PathSettings,
    #[serde(default)]
    build: BuildSettings,
}

#[derive(Debug, Deserialize, Default)]
struct SiteSettings {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct PathSettings {
    #[serde(default = "default_root")]
    root: String,
    #[serde(default = "default_views")]
    views: String,
    #[serde(default = "default_markdown")]
    markdown: String,
    #[serde(default)]
    assets: Vec<String>,
    #[serde(default = "default_routes")]
    routes: String,
}

#[derive(Debug, Deserialize)]
struct BuildSettings {
    #[serde(default = "default_output")]
    output: String,
    #[serde(default = "default_work_dir")]
    work_dir: String,
    #[serde(default = "default_clean_work_dir")]
    clean_work_dir: bool,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            root: default_root(),
            views: default_views(),
            markdown: default_markdown(),
            assets: Vec::new(),
            routes: default_routes(),
        }
    }
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            output: default_output(),
            work_dir: default_work_dir(),
            clean_work_dir: default_clean_work_dir(),
        }
    }
}

fn default_root() -> String {
    "src".to_string()
}
fn default_views() -> String {
    "views".to_string()
}
fn default_markdown() -> String {
    "markdown".to_string()
}
fn default_routes() -> String {
    "routes.json".to_string()
}
fn default_output() -> String {
    "dist".to_string()
}
fn default_work_dir() -> String {
    "tmp".to_string()
}
fn default_clean_work_dir() -> bool {
    true
}

impl From<ConfigFile> for ProjectPaths {
    fn from(file: ConfigFile) -> Self {
        Self {
            root: PathBuf::from(file.paths.root),
            views: PathBuf::from(file.paths.views),
            markdown: PathBuf::from(file.paths.markdown),
            assets: file.paths.assets.into_iter().map(PathBuf::from).collect(),
            routes: PathBuf::from(file.paths.routes),
            output: PathBuf::from(file.build.output),
            work_dir: PathBuf::from(file.build.work_dir),
            title: file.site.title,
            clean_work_dir: file.build.clean_work_dir,
        }
    }
}

/// Load configuration from the config file if it exists.
/// Returns an error if the config file exists but is malformed.
fn load_config(path: &Path) -> Result<ConfigFile> {
    if !path.exists() {
        tracing::debug!("No {} found, using defaults", path.display());
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::info!("Loaded config from {}", path.display());

    Ok(config)
}

/// Run the build command.
pub async fn run(config_path: &Path, output: Option<PathBuf>, clean: Option<bool>) -> Result<()> {
    tracing::info!("Building static site...");

    let mut paths = ProjectPaths::from(load_config(config_path)?);
    if let Some(output) = output {
        paths.output = output;
    }
    if let Some(clean) = clean {
        paths.clean_work_dir = clean;
    }

    let report = SiteBuilder::new(BuildConfig::resolve(paths)).build().await?;

    tracing::info!(
        "Built {} pages from {} markdown files, copied {} assets in {}ms",
        report.pages,
        report.documents,
        report.assets,
        report.duration_ms
    );

    if !report.is_success() {
        for failure in &report.failures {
            tracing::error!("{}", failure);
        }
        anyhow::bail!("Build finished with {} failure(s)", report.failures.len());
    }

    tracing::info!("Output: {}", report.output_dir.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let file: ConfigFile = toml::from_str(
            r#"
[site]
title = "Field Notes"

[paths]
root = "./site"
views = "templates"
markdown = "posts"
assets = ["css", "img"]
routes = "routes.json"

[build]
output = "./public"
work_dir = ".trellis"
clean_work_dir = false
"#,
        )
        .unwrap();

        let config = BuildConfig::resolve(ProjectPaths::from(file));

        assert_eq!(config.title, "Field Notes");
        assert_eq!(config.views_dir, PathBuf::from("site/templates"));
        assert_eq!(config.markdown_dir, PathBuf::from("site/posts"));
        assert_eq!(
            config.assets,
            vec![PathBuf::from("site/css"), PathBuf::from("site/img")]
        );
        assert_eq!(config.routes_file, PathBuf::from("site/routes.json"));
        assert_eq!(config.output_dir, PathBuf::from("public"));
        assert_eq!(config.work_dir, PathBuf::from(".trellis"));
        assert!(!config.clean_work_dir);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let file: ConfigFile = toml::from_str("[site]\ntitle = \"Docs\"\n").unwrap();

        let paths = ProjectPaths::from(file);

        assert_eq!(paths.root, PathBuf::from("src"));
        assert_eq!(paths.output, PathBuf::from("dist"));
        assert_eq!(paths.work_dir, PathBuf::from("tmp"));
        assert!(paths.assets.is_empty());
        assert!(paths.clean_work_dir);
    }

    #[test]
    fn rejects_malformed_config() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("trellis.toml");
        fs::write(&path, "[site\ntitle = ").unwrap();

        assert!(load_config(&path).is_err());
    }

    #[test]
    fn missing_config_file_is_default() {
        let temp = tempfile::tempdir().unwrap();

        let config = load_config(&temp.path().join("trellis.toml")).unwrap();

        assert_eq!(config.build.output, "dist");
    }
}
