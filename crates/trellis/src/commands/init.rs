//! Initialize a starter project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing trellis project...");

    let created = scaffold(Path::new("."), config_path, yes)?;

    if created == 0 {
        tracing::warn!("Project files already exist. Use --yes to overwrite.");
        return Ok(());
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'trellis build' to generate the site.");

    Ok(())
}

/// Write the starter files under `base`, returning how many were written.
/// Existing files are kept unless `overwrite` is set.
fn scaffold(base: &Path, config_path: &Path, overwrite: bool) -> Result<usize> {
    let files = [
        ("src/routes.json", DEFAULT_ROUTES),
        ("src/views/layout.html", DEFAULT_LAYOUT),
        ("src/views/home.html", DEFAULT_HOME),
        ("src/markdown/getting-started.md", DEFAULT_GETTING_STARTED),
        ("src/css/site.css", DEFAULT_CSS),
    ];

    let mut created = 0;

    if write_file(&base.join(config_path), DEFAULT_CONFIG, overwrite)? {
        created += 1;
    }

    for (relative, content) in files {
        if write_file(&base.join(relative), content, overwrite)? {
            created += 1;
        }
    }

    Ok(created)
}

fn write_file(path: &Path, content: &str, overwrite: bool) -> Result<bool> {
    if path.exists() && !overwrite {
        tracing::debug!("Keeping existing {}", path.display());
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!("Created {}", path.display());

    Ok(true)
}

const DEFAULT_CONFIG: &str = r#"# trellis configuration

[site]
# Site title, the first part of every page title
title = "My Site"

[paths]
# Source root; the paths below are relative to it
root = "src"
views = "views"
markdown = "markdown"
assets = ["css"]
routes = "routes.json"

[build]
# Output directory for the built site
output = "dist"

# Staging area for intermediate templates, purged on every build
work_dir = "tmp"
clean_work_dir = true
"#;

const DEFAULT_ROUTES: &str = r#"{
  ".": { "file": "home", "layout": "layout" },
  "docs": {
    "getting-started": { "file": "getting-started", "layout": "layout" }
  }
}
"#;

const DEFAULT_LAYOUT: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ title }}</title>
  <link rel="stylesheet" href="{{ relative }}css/site.css">
</head>
<body>
  <header>
    <a href="{{ relative }}">Home</a>
    <a href="{{ relative }}docs/getting-started/">Getting Started</a>
  </header>
  {% if headings %}
  <aside class="toc">
    <h2>On this page</h2>
    <ul>
    {% for heading in headings %}
      <li><a href="#{{ heading.link }}">{{ heading.text }}</a></li>
    {% endfor %}
    </ul>
  </aside>
  {% endif %}
  <main>
    {{ body }}
  </main>
</body>
</html>
"##;

const DEFAULT_HOME: &str = r#"<h1>Welcome</h1>
<p>This page comes from <code>src/views/home.html</code>.</p>
"#;

const DEFAULT_GETTING_STARTED: &str = r#"# Getting Started

Pages are listed in `src/routes.json`. Every route becomes a directory with
its own `index.html`.

## Writing Pages

Markdown files in `src/markdown` become templates named after the file, so
`getting-started.md` is referenced as `getting-started`.

## Layouts

Give a route a `layout` to wrap the page. The layout receives the rendered
page as `body`, along with `title`, `relative` and `headings`.
"#;

const DEFAULT_CSS: &str = r#"body {
  font-family: system-ui, -apple-system, sans-serif;
  line-height: 1.6;
  margin: 0 auto;
  max-width: 48rem;
  padding: 2rem;
}

header a {
  margin-right: 1rem;
}

.toc {
  border-left: 2px solid #ddd;
  padding-left: 1rem;
}
"#;
