//! Markdown rendering with heading outline extraction.
//!
//! This crate converts Markdown sources into HTML fragments and returns the
//! document's heading outline alongside each conversion, ready to be used as a
//! per-page table of contents.

pub mod heading;
pub mod render;

pub use heading::{heading_link, HeadingEntry};
pub use render::{render_markdown, RenderedMarkdown};
