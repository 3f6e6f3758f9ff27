//! Template file naming rules shared by the pipeline stages.

use std::path::Path;

/// Extension given to templates named without one.
pub const TEMPLATE_EXTENSION: &str = "html";

/// Manifest key for a directory's own index page.
pub const INDEX_KEY: &str = ".";

/// Resolve a template reference to a filename, adding the template extension
/// only when the name has none.
pub fn template_filename(name: &str) -> String {
    if Path::new(name).extension().is_some() {
        name.to_string()
    } else {
        format!("{name}.{TEMPLATE_EXTENSION}")
    }
}

/// Drop the final extension from a filename, keeping any directory part.
pub fn strip_extension(file: &str) -> &str {
    match Path::new(file).extension() {
        Some(ext) => &file[..file.len() - ext.len() - 1],
        None => file,
    }
}

/// Name of the intermediate template produced from a Markdown source.
pub fn intermediate_filename(source: &Path) -> Option<String> {
    let name = source.file_name()?.to_str()?;

    let base = match source.extension() {
        Some(_) => source.file_stem()?.to_str()?,
        None => name,
    };

    Some(format!("{base}.{TEMPLATE_EXTENSION}"))
}
