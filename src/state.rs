use std::{io::Write, path::Path};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::{error::ParseError, parse::extract_book_list, types::book::Book};

/// Everything needed to bring the result list back after a restart
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCache {
    /// Body of the last response that parsed successfully
    pub last_response: Option<String>,
}

impl SearchCache {
    pub fn new(last_response: impl Into<String>) -> Self {
        Self {
            last_response: Some(last_response.into()),
        }
    }

    /// Rebuild the book list from the retained response without touching
    /// the network. `None` when nothing has been retained yet.
    pub fn replay(&self) -> Option<Result<Vec<Book>, ParseError>> {
        self.last_response.as_deref().map(extract_book_list)
    }

    /// Serialize the cache to a string
    pub fn serialize(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from a string to a cache
    pub fn deserialize(s: &str) -> Result<SearchCache> {
        Ok(serde_json::from_str(s)?)
    }

    /// Read the cache from `path`; a missing file is an empty cache.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(s) => {
                debug!("Restoring session from {}", path.display());
                Self::deserialize(&s)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => {
                warn!("Couldn't read session state from {}: {e}", path.display());
                Err(e.into())
            }
        }
    }

    /// Replace the file at `path` through a temporary file in the same
    /// directory. Readers see either the old cache or the new one.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(self.serialize()?.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(path)?;
        debug!("Saved session to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const RAW: &str = r#"{"items":[{"volumeInfo":{"title":"T","previewLink":"http://x"}}]}"#;

    #[test]
    fn empty_cache_replays_nothing() {
        assert!(SearchCache::default().replay().is_none());
    }

    #[test]
    fn replay_is_repeatable() {
        let cache = SearchCache::new(RAW);
        let first = cache.replay().unwrap().unwrap();
        let second = cache.replay().unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn string_round_trip() {
        let cache = SearchCache::new(RAW);
        let restored = SearchCache::deserialize(&cache.serialize().unwrap()).unwrap();
        assert_eq!(cache, restored);
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        assert_eq!(SearchCache::load(&path).unwrap(), SearchCache::default());

        let cache = SearchCache::new(RAW);
        cache.save(&path).unwrap();
        assert_eq!(SearchCache::load(&path).unwrap(), cache);
    }

    #[test]
    fn save_replaces_existing_file_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{\"last_response\":\"an older and much longer response body\"}").unwrap();

        let cache = SearchCache::new(RAW);
        cache.save(&path).unwrap();
        assert_eq!(SearchCache::load(&path).unwrap(), cache);

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries, ["session.json"]);
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(SearchCache::load(&path).is_err());
    }
}
