//! Template engine for rendering pages.

use std::path::Path;

use minijinja::{context, path_loader, Environment, Value};
use serde::Serialize;

use trellis_md::HeadingEntry;

use crate::names::template_filename;

/// Values every page template receives.
#[derive(Debug, Clone, Serialize)]
pub struct PageParams {
    /// Page title
    pub title: String,
    /// Prefix leading back to the site root
    pub relative: String,
    /// Table of contents
    pub headings: Vec<HeadingEntry>,
}

/// Template engine using minijinja.
///
/// Layouts and includes are loaded from the views directory the engine was
/// created with. Templates whose name ends in `.html` are auto-escaped.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create an engine loading templates from `views_dir`.
    pub fn new(views_dir: impl AsRef<Path>) -> Self {
        let mut env = Environment::new();
        env.set_loader(path_loader(views_dir.as_ref().to_path_buf()));

        Self { env }
    }

    /// Render template source directly.
    pub fn render_page(
        &self,
        name: &str,
        source: &str,
        params: &PageParams,
    ) -> Result<String, minijinja::Error> {
        self.env
            .render_named_str(name, source, page_context(params, None))
    }

    /// Render template source and place the result in a layout.
    ///
    /// The layout receives the same parameters plus `body`, the rendered page.
    pub fn render_with_layout(
        &self,
        layout: &str,
        name: &str,
        source: &str,
        params: &PageParams,
    ) -> Result<String, minijinja::Error> {
        let body = self.render_page(name, source, params)?;

        let tmpl = self.env.get_template(&template_filename(layout))?;

        tmpl.render(page_context(params, Some(body)))
    }
}

// `relative` is a run of `../` and must reach attributes unescaped.
fn page_context(params: &PageParams, body: Option<String>) -> Value {
    context! {
        title => &params.title,
        relative => Value::from_safe_string(params.relative.clone()),
        headings => &params.headings,
        body => body.map(Value::from_safe_string).unwrap_or_default(),
    }
}
