use thiserror::Error;

/// Rejections produced while turning user text into a search URL
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Please enter a valid search query")]
    EmptyQuery,

    #[error("Error while making URL: {0}")]
    UrlConstructionFailed(#[from] url::ParseError),
}

/// Failure to get a 200 response body from the remote end
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error {0}")]
    Status(u16),

    #[error("Error while attempting HTTP connection: {0}")]
    Transport(#[from] reqwest::Error),
}

/// The response did not have the expected shape.
///
/// `path` points at the first field that could not be read, for example
/// `items[2].volumeInfo.previewLink`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Error while handling JSON at `{path}`: {message}")]
pub struct ParseError {
    pub path:    String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Network(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}
