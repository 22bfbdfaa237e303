use tracing::error;
use url::Url;

use crate::error::QueryError;

pub const BOOK_SEARCH_URL: &str = "https://www.googleapis.com/books/v1/volumes?q=";

const SEPARATOR: &str = "%20";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Append `%20` after the last word as well, the way the search URL has
    /// always been built.
    pub trailing_separator: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            trailing_separator: true,
        }
    }
}

/// Encode user text as the value of the `q` parameter.
///
/// Words are split on single spaces and glued back with `%20`, so two
/// consecutive spaces give two separators. Spaces at the end of the input
/// produce no extra separators.
pub fn encode_query(text: &str, options: QueryOptions) -> Result<String, QueryError> {
    // Only ASCII control characters and the space count as blank
    if text.trim_matches(|c: char| c <= ' ').is_empty() {
        return Err(QueryError::EmptyQuery);
    }
    let mut words: Vec<&str> = text.split(' ').collect();
    while words.last().is_some_and(|w| w.is_empty()) {
        words.pop();
    }
    let mut query = String::new();
    for (i, word) in words.iter().enumerate() {
        query.push_str(&urlencoding::encode(word));
        if options.trailing_separator || i + 1 < words.len() {
            query.push_str(SEPARATOR);
        }
    }
    Ok(query)
}

/// Build the full search URL for `text` against `endpoint`.
pub fn build_search_url(
    endpoint: &str,
    text: &str,
    options: QueryOptions,
) -> Result<Url, QueryError> {
    let query = encode_query(text, options)?;
    Url::parse(&format!("{endpoint}{query}")).map_err(|e| {
        error!("Error while making URL from {endpoint:?}: {e}");
        QueryError::UrlConstructionFailed(e)
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn encode(text: &str) -> String {
        encode_query(text, QueryOptions::default()).unwrap()
    }

    #[test]
    fn the_hobbit() {
        let url = build_search_url(BOOK_SEARCH_URL, "the hobbit", QueryOptions::default()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/books/v1/volumes?q=the%20hobbit%20"
        );
    }

    #[test]
    fn single_word_gets_trailing_separator() {
        assert_eq!(encode("dune"), "dune%20");
    }

    #[test]
    fn trailing_separator_can_be_turned_off() {
        let options = QueryOptions {
            trailing_separator: false,
        };
        assert_eq!(encode_query("the hobbit", options).unwrap(), "the%20hobbit");
        assert_eq!(encode_query("dune", options).unwrap(), "dune");
    }

    #[test]
    fn spaces_are_split_one_at_a_time() {
        assert_eq!(encode("a  b"), "a%20%20b%20");
        assert_eq!(encode(" a"), "%20a%20");
        assert_eq!(encode("a   "), "a%20");
    }

    #[test]
    fn reserved_characters_are_escaped() {
        assert_eq!(encode("c++ #1"), "c%2B%2B%20%231%20");
        assert_eq!(encode("über"), "%C3%BCber%20");
    }

    #[test]
    fn blank_input_is_rejected() {
        for text in ["", " ", "\t\n ", "   ", "\r\u{0}\u{1f}"] {
            assert!(matches!(
                encode_query(text, QueryOptions::default()),
                Err(QueryError::EmptyQuery)
            ));
            assert!(matches!(
                build_search_url(BOOK_SEARCH_URL, text, QueryOptions::default()),
                Err(QueryError::EmptyQuery)
            ));
        }
    }

    #[test]
    fn non_ascii_whitespace_is_a_query() {
        assert_eq!(encode("\u{a0}"), "%C2%A0%20");
        assert_eq!(encode("\u{3000}dune"), "%E3%80%80dune%20");
    }

    #[test]
    fn bad_endpoint_fails_construction() {
        let result = build_search_url("not a url?q=", "dune", QueryOptions::default());
        assert!(matches!(result, Err(QueryError::UrlConstructionFailed(_))));
    }
}
