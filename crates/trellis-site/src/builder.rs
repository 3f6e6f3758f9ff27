//! Static site builder.

use std::path::PathBuf;
use std::time::Instant;

use crate::assembler::PageAssembler;
use crate::assets::AssetStager;
use crate::config::BuildConfig;
use crate::manifest::{load_manifest, ManifestError};
use crate::preprocess::preprocess_markdown;
use crate::report::{BuildReport, Stage, StageFailure};
use crate::resolver::{attach_headings, resolve_routes, ResolveError};
use crate::templates::TemplateEngine;
use crate::workdir::WorkDir;

/// Errors that abort a build before pages are written.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Unusable work directory {}: {reason}", .path.display())]
    WorkDir { path: PathBuf, reason: String },
}

/// Static site builder.
pub struct SiteBuilder {
    config: BuildConfig,
}

impl SiteBuilder {
    /// Create a new site builder.
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Build the site.
    ///
    /// Manifest, route and work directory problems abort the build before
    /// anything is written to the output directory. Failures of individual
    /// documents, pages or assets are collected in the report instead.
    pub async fn build(&self) -> Result<BuildReport, BuildError> {
        let start = Instant::now();
        let config = &self.config;
        let mut failures: Vec<StageFailure> = Vec::new();

        let manifest = load_manifest(&config.routes_file)?;

        let work_dir = WorkDir::new(&config.work_dir);
        work_dir
            .validate(&config.root, &config.output_dir)
            .map_err(|reason| BuildError::WorkDir {
                path: config.work_dir.clone(),
                reason,
            })?;
        work_dir
            .acquire(config.clean_work_dir)
            .await
            .map_err(|e| BuildError::WorkDir {
                path: config.work_dir.clone(),
                reason: e.to_string(),
            })?;

        match work_dir.stage_views(&config.views_dir).await {
            Ok(count) => tracing::info!("Finished: Copy Views ({} files)", count),
            Err(e) => failures.push(StageFailure::new(
                Stage::Views,
                &config.views_dir,
                format!("Failed to copy views: {e}"),
            )),
        }

        let preprocessed = preprocess_markdown(&config.markdown_dir, work_dir.path()).await;
        let headings = preprocessed.heading_index();
        failures.extend(preprocessed.failures);

        let mut jobs = resolve_routes(&manifest, &config.output_dir, work_dir.path())?;
        attach_headings(&mut jobs, &headings);
        tracing::info!("Finished: Resolving {} routes", jobs.len());

        let engine = TemplateEngine::new(work_dir.path());
        let assembled = PageAssembler::new(&engine, &config.title)
            .assemble_all(&jobs)
            .await;
        failures.extend(assembled.failures);
        tracing::info!("Finished: Creating all pages.");

        let assets = AssetStager::new(&config.root, &config.output_dir)
            .stage(&config.assets)
            .await;
        failures.extend(assets.failures);
        tracing::info!("Finished: Copy Assets");

        Ok(BuildReport {
            documents: preprocessed.documents.len(),
            pages: assembled.written.len(),
            assets: assets.copied,
            failures,
            duration_ms: start.elapsed().as_millis() as u64,
            output_dir: config.output_dir.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectPaths;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn project(base: &Path) -> BuildConfig {
        BuildConfig::resolve(ProjectPaths {
            root: base.join("src"),
            assets: vec![PathBuf::from("css"), PathBuf::from("images")],
            output: base.join("dist"),
            work_dir: base.join("tmp"),
            title: "my-site".to_string(),
            ..Default::default()
        })
    }

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[tokio::test]
    async fn builds_site_from_manifest() {
        let temp = tempdir().unwrap();
        let base = temp.path();
        let src = base.join("src");

        write(
            &src.join("routes.json"),
            r#"{
                ".": "home",
                "docs": {
                    ".": { "file": "docs", "layout": "layout" },
                    "getting-started": { "file": "getting-started", "layout": "layout" }
                }
            }"#,
        );
        write(&src.join("views/home.html"), "<h1>{{ title }}</h1>");
        write(
            &src.join("views/layout.html"),
            "<title>{{ title }}</title>\
             <link rel=\"stylesheet\" href=\"{{ relative }}css/site.css\">\
             <ul>{% for h in headings %}<li><a href=\"#{{ h.link }}\">{{ h.text }}</a></li>{% endfor %}</ul>\
             {{ body }}",
        );
        write(&src.join("markdown/docs.md"), "# Documentation\n");
        write(
            &src.join("markdown/guides/getting-started.md"),
            "# Getting Started\n\n## FAQ (v2)\n",
        );
        write(&src.join("css/site.css"), "body {}");

        let report = SiteBuilder::new(project(base)).build().await.unwrap();

        assert!(report.is_success(), "failures: {:?}", report.failures);
        assert_eq!(report.documents, 2);
        assert_eq!(report.pages, 3);
        assert_eq!(report.assets, 1);

        let dist = base.join("dist");
        assert_eq!(
            fs::read_to_string(dist.join("index.html")).unwrap(),
            "<h1>My site</h1>"
        );

        let page = fs::read_to_string(dist.join("docs/getting-started/index.html")).unwrap();
        assert!(page.contains("<title>My site - Docs - Getting started</title>"));
        assert!(page.contains(r#"href="../../css/site.css""#));
        assert!(page.contains(r##"<a href="#faq-v2">FAQ (v2)</a>"##));
        assert!(page.contains(r#"<h2 id="faq-v2">FAQ (v2)</h2>"#));

        let docs = fs::read_to_string(dist.join("docs/index.html")).unwrap();
        assert!(docs.contains(r#"href="../css/site.css""#));
        assert!(docs.contains("Documentation"));

        assert!(dist.join("css/site.css").exists());
        assert!(!dist.join("images").exists());
    }

    #[tokio::test]
    async fn malformed_manifest_writes_nothing() {
        let temp = tempdir().unwrap();
        let base = temp.path();
        write(&base.join("src/routes.json"), r#"{ ".": "home", "#);
        write(&base.join("src/views/home.html"), "home");
        write(&base.join("src/css/site.css"), "body {}");

        let result = SiteBuilder::new(project(base)).build().await;

        assert!(matches!(
            result,
            Err(BuildError::Manifest(ManifestError::Malformed { .. }))
        ));
        assert!(!base.join("dist").exists());
        assert!(!base.join("tmp").exists());
    }

    #[tokio::test]
    async fn work_dir_enclosing_the_project_is_refused() {
        let temp = tempdir().unwrap();
        let base = temp.path();
        write(&base.join("src/routes.json"), r#"{ ".": "home" }"#);
        write(&base.join("src/views/home.html"), "home");

        let config = BuildConfig {
            work_dir: base.to_path_buf(),
            ..project(base)
        };
        let err = SiteBuilder::new(config).build().await.unwrap_err();

        assert!(matches!(err, BuildError::WorkDir { .. }));
        assert!(base.join("src/routes.json").exists());
        assert!(base.join("src/views/home.html").exists());
    }

    #[tokio::test]
    async fn missing_manifest_is_fatal() {
        let temp = tempdir().unwrap();

        let result = SiteBuilder::new(project(temp.path())).build().await;

        assert!(matches!(
            result,
            Err(BuildError::Manifest(ManifestError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn reports_page_failures_and_keeps_going() {
        let temp = tempdir().unwrap();
        let base = temp.path();
        write(
            &base.join("src/routes.json"),
            r#"{ ".": "home", "broken": "missing-template" }"#,
        );
        write(&base.join("src/views/home.html"), "home");

        let report = SiteBuilder::new(project(base)).build().await.unwrap();

        assert!(!report.is_success());
        assert_eq!(report.pages, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].stage, Stage::Pages);
        assert_eq!(
            report.failures[0].path,
            base.join("dist/missing-template/index.html")
        );
        assert!(base.join("dist/index.html").exists());
    }

    #[tokio::test]
    async fn duplicate_routes_abort_the_build() {
        let temp = tempdir().unwrap();
        let base = temp.path();
        write(
            &base.join("src/routes.json"),
            r#"{ "a": "page", "b": { "file": "page.html" } }"#,
        );
        write(&base.join("src/views/page.html"), "page");

        let result = SiteBuilder::new(project(base)).build().await;

        assert!(matches!(
            result,
            Err(BuildError::Resolve(ResolveError::DuplicateOutput { .. }))
        ));
        assert!(!base.join("dist").exists());
    }

    #[tokio::test]
    async fn markdown_shadows_same_named_view() {
        let temp = tempdir().unwrap();
        let base = temp.path();
        write(&base.join("src/routes.json"), r#"{ ".": "about" }"#);
        write(&base.join("src/views/about.html"), "hand written");
        write(&base.join("src/markdown/about.md"), "from *markdown*");

        SiteBuilder::new(project(base)).build().await.unwrap();

        let html = fs::read_to_string(base.join("dist/index.html")).unwrap();
        assert_eq!(html.trim_end(), "<p>from <em>markdown</em></p>");
    }
}
