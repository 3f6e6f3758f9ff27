//! Markdown to HTML conversion.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};

use crate::heading::HeadingEntry;

/// The result of rendering one Markdown document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedMarkdown {
    /// HTML fragment
    pub html: String,

    /// Headings in document order
    pub headings: Vec<HeadingEntry>,
}

/// Render a Markdown document to HTML and collect its headings.
///
/// Heading text is the plain text of the heading's inline content, not its
/// Markdown source: emphasis and code markers are dropped, so
/// ``## The *quick* `fox` `` yields `The quick fox` and links as
/// `the-quick-fox`. Each rendered heading gets an `id` equal to its link so
/// that table of contents anchors resolve within the page.
pub fn render_markdown(source: &str) -> RenderedMarkdown {
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS;

    let mut events: Vec<Event> = Parser::new_ext(source, options).collect();

    let collected = collect_headings(&events);

    for (start, entry) in &collected {
        if let Event::Start(Tag::Heading { id, .. }) = &mut events[*start] {
            *id = Some(CowStr::from(entry.link.clone()));
        }
    }

    let mut html_output = String::new();
    html::push_html(&mut html_output, events.into_iter());

    RenderedMarkdown {
        html: html_output,
        headings: collected.into_iter().map(|(_, entry)| entry).collect(),
    }
}

/// Walk the event stream, pairing each heading with the index of its start event.
fn collect_headings(events: &[Event]) -> Vec<(usize, HeadingEntry)> {
    let mut headings = Vec::new();
    let mut current: Option<(usize, String)> = None; // (start index, text)

    for (index, event) in events.iter().enumerate() {
        match event {
            Event::Start(Tag::Heading { .. }) => {
                current = Some((index, String::new()));
            }

            Event::Text(text) | Event::Code(text) => {
                if let Some((_, ref mut heading_text)) = current {
                    heading_text.push_str(text);
                }
            }

            Event::End(TagEnd::Heading(_)) => {
                if let Some((start, text)) = current.take() {
                    headings.push((start, HeadingEntry::new(text)));
                }
            }

            _ => {}
        }
    }

    headings
}
