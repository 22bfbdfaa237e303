use tracing::error;

use crate::{
    error::ParseError,
    types::{
        book::Book,
        volumes::{Volume, Volumes},
    },
};

/// Turn a search response body into a book list.
///
/// Either every item becomes a [Book] or the whole body is rejected; a list
/// with some items missing is never returned. An `items` array with no
/// entries is a valid, empty result.
pub fn extract_book_list(raw: &str) -> Result<Vec<Book>, ParseError> {
    let volumes = deserialize(raw).map_err(|e| {
        error!("{e}");
        e
    })?;
    Ok(volumes.items.into_iter().map(Book::from).collect())
}

fn deserialize(raw: &str) -> Result<Volumes, ParseError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let volumes: Volumes =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|e| ParseError {
            path:    e.path().to_string(),
            message: e.inner().to_string(),
        })?;
    deserializer.end().map_err(|e| ParseError {
        path:    ".".into(),
        message: e.to_string(),
    })?;
    Ok(volumes)
}

impl From<Volume> for Book {
    fn from(volume: Volume) -> Self {
        let info = volume.volume_info;
        let description = match volume.search_info {
            Some(search_info) => search_info.text_snippet.unwrap_or_default(),
            None => info.description.unwrap_or_default(),
        };
        Book {
            title: info.title,
            authors: info.authors.unwrap_or_default(),
            description,
            preview_url: info.preview_link,
            image_url: info.image_links.and_then(|links| links.small_thumbnail),
        }
    }
}
