use std::fmt::Display;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{config::Config, traits::DisplayTerminal};

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));

/// One search result
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub title:       String,
    pub authors:     Vec<String>,
    pub description: String,
    pub preview_url: String,
    pub image_url:   Option<String>,
}

impl Book {
    pub fn new(
        title: impl Into<String>,
        authors: Vec<String>,
        description: impl Into<String>,
        preview_url: impl Into<String>,
        image_url: Option<String>,
    ) -> Self {
        Self {
            title: title.into(),
            authors,
            description: description.into(),
            preview_url: preview_url.into(),
            image_url,
        }
    }

    /// Authors separated by commas, empty when there are none
    pub fn authors_joined(&self) -> String {
        self.authors.join(", ")
    }

    /// The description with markup removed and entities decoded.
    /// Search snippets come back with `<b>` tags and `&quot;` style escapes.
    pub fn plain_description(&self) -> String {
        let stripped = TAG_RE.replace_all(&self.description, "");
        html_escape::decode_html_entities(&stripped).trim().to_string()
    }
}

impl Display for Book {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title)?;
        if !self.authors.is_empty() {
            write!(f, " by {}", self.authors_joined())?;
        }
        Ok(())
    }
}

impl DisplayTerminal for Book {
    fn fmt_to_string(&self, config: &Config) -> String {
        let mut lines = vec![config.output_title.format_str(&self.title)];
        if !self.authors.is_empty() {
            lines.push(config.output_authors.format_str(self.authors_joined()));
        }
        let description = self.plain_description();
        if description.is_empty() {
            lines.push(config.output_description.format_str("No description available"));
        } else {
            lines.push(config.output_description.format_str(description));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn display_with_and_without_authors() {
        let mut book = Book::new(
            "Dracula",
            vec!["Bram Stoker".into()],
            "",
            "http://books.google.com/books?id=1",
            None,
        );
        assert_eq!(book.to_string(), "Dracula by Bram Stoker");
        book.authors.clear();
        assert_eq!(book.to_string(), "Dracula");
    }

    #[test]
    fn authors_are_comma_separated() {
        let book = Book {
            authors: vec!["Terry Pratchett".into(), "Neil Gaiman".into()],
            ..Book::default()
        };
        assert_eq!(book.authors_joined(), "Terry Pratchett, Neil Gaiman");
    }

    #[test]
    fn plain_description_strips_markup() {
        let book = Book {
            description: "In a hole in the ground there lived a <b>hobbit</b>. &quot;Not a nasty, dirty, wet hole&quot;".into(),
            ..Book::default()
        };
        assert_eq!(
            book.plain_description(),
            "In a hole in the ground there lived a hobbit. \"Not a nasty, dirty, wet hole\""
        );
    }

    #[test]
    fn empty_description_is_reported() {
        let config = Config::default();
        let book = Book::new("T", vec![], "", "http://x", None);
        let rendered = book.fmt_to_string(&config);
        assert!(rendered.contains("No description available"));
        assert!(rendered.contains('T'));
    }
}
