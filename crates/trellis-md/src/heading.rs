//! Heading outline entries and anchor derivation.

use serde::Serialize;

/// A heading encountered while rendering a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeadingEntry {
    /// Heading text
    pub text: String,
    /// Anchor derived from the text
    pub link: String,
}

impl HeadingEntry {
    /// Create an entry, deriving the link from the text.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let link = heading_link(&text);
        Self { text, link }
    }
}

/// Derive an anchor link from heading text.
///
/// Whitespace runs become a single `-`, the characters `()[]/\` are dropped,
/// and the result is lower-cased. Equal texts always produce equal links, so
/// repeated headings share an anchor.
pub fn heading_link(text: &str) -> String {
    let mut link = String::with_capacity(text.len());
    let mut in_whitespace = false;

    for c in text.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                link.push('-');
                in_whitespace = true;
            }
            continue;
        }

        in_whitespace = false;

        if matches!(c, '(' | ')' | '[' | ']' | '/' | '\\') {
            continue;
        }

        link.extend(c.to_lowercase());
    }

    link
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace_runs() {
        assert_eq!(heading_link("Getting Started"), "getting-started");
        assert_eq!(heading_link("Multiple   Spaces\tHere"), "multiple-spaces-here");
        assert_eq!(heading_link(" padded "), "-padded-");
    }

    #[test]
    fn strips_brackets_and_slashes() {
        assert_eq!(heading_link("FAQ (v2)"), "faq-v2");
        assert_eq!(heading_link("[Draft] a/b\\c"), "draft-abc");
    }

    #[test]
    fn collapses_before_stripping() {
        // The space on either side of the bracket survives as its own hyphen.
        assert_eq!(heading_link("a ( b"), "a--b");
        assert_eq!(heading_link("a (  ) b"), "a---b");
    }

    #[test]
    fn keeps_other_punctuation() {
        assert_eq!(heading_link("What's new?"), "what's-new?");
        assert_eq!(heading_link("C++ & Rust"), "c++-&-rust");
    }

    #[test]
    fn derivation_is_idempotent() {
        let samples = [
            "Getting Started",
            "FAQ (v2)",
            "  Lots\n of \t Whitespace ",
            "[Mixed] (Case) / Path\\Thing",
            "ÜBER Größe",
        ];

        for text in samples {
            let link = heading_link(text);
            assert_eq!(heading_link(&link), link, "re-deriving {text:?}");
            assert!(!link.chars().any(char::is_whitespace));
            assert!(!link.chars().any(|c| "()[]/\\".contains(c)));
            assert!(!link.chars().any(char::is_uppercase));
        }
    }

    #[test]
    fn duplicate_texts_share_a_link() {
        let a = HeadingEntry::new("Usage");
        let b = HeadingEntry::new("Usage");
        assert_eq!(a, b);
        assert_eq!(a.link, "usage");
    }
}
