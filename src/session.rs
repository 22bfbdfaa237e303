//! Query → fetch → parse orchestration.
//!
//! A [Session] lives on the interaction loop. Fetches run as tokio tasks and
//! report back over a channel; only [Session::apply] touches the current list
//! and the retained response, so no locking is needed.
//!
//! Overlapping searches are not cancelled. Each submission gets a sequence
//! number and completions for anything older than the newest submission are
//! dropped, so a slow early response can never overwrite a later one.

use std::time::Duration;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info};
use url::Url;

use crate::{
    client::Fetcher,
    config::Config,
    error::{FetchError, QueryError, SearchError},
    parse::extract_book_list,
    query::{build_search_url, QueryOptions},
    state::SearchCache,
    types::book::Book,
};

/// A response body together with the list parsed from it
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched {
    pub raw:   String,
    pub books: Vec<Book>,
}

/// Result of one background search, tagged with its submission number
#[derive(Debug)]
pub struct Completion {
    pub seq:    u64,
    pub result: Result<Fetched, SearchError>,
}

/// What [Session::apply] did with a completion
#[derive(Debug)]
pub enum Update {
    /// The list was replaced; holds the new length
    Replaced(usize),
    /// A newer search was submitted in the meantime; ignored
    Stale,
    /// The search failed; the list was left as it was
    Failed(SearchError),
}

pub async fn fetch_and_parse(fetcher: &Fetcher, url: Url) -> Result<Fetched, SearchError> {
    let raw = fetcher.get_text(url).await?;
    let books = extract_book_list(&raw)?;
    Ok(Fetched { raw, books })
}

pub struct Session {
    fetcher:  Fetcher,
    endpoint: String,
    options:  QueryOptions,
    cache:    SearchCache,
    books:    Option<Vec<Book>>,
    issued:   u64,
    sender:   UnboundedSender<Completion>,
    receiver: UnboundedReceiver<Completion>,
}

impl Session {
    pub fn new(fetcher: Fetcher, endpoint: impl Into<String>, options: QueryOptions) -> Self {
        let (sender, receiver) = unbounded_channel();
        Self {
            fetcher,
            endpoint: endpoint.into(),
            options,
            cache: SearchCache::default(),
            books: None,
            issued: 0,
            sender,
            receiver,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let fetcher = Fetcher::new(
            Duration::from_millis(config.connect_timeout_ms),
            Duration::from_millis(config.read_timeout_ms),
        )?;
        Ok(Self::new(
            fetcher,
            config.endpoint.clone(),
            QueryOptions {
                trailing_separator: config.trailing_separator,
            },
        ))
    }

    pub fn fetcher(&self) -> &Fetcher {
        &self.fetcher
    }

    /// The list currently on display, `None` if there has never been a
    /// successful search (or restore)
    pub fn books(&self) -> Option<&[Book]> {
        self.books.as_deref()
    }

    pub fn book(&self, index: usize) -> Option<&Book> {
        self.books.as_ref().and_then(|books| books.get(index))
    }

    pub fn cache(&self) -> &SearchCache {
        &self.cache
    }

    /// Bring back the state saved by a previous run. The book list is
    /// re-parsed from the retained response; nothing is fetched.
    pub fn restore(&mut self, cache: SearchCache) {
        self.books = match cache.replay() {
            Some(Ok(books)) => {
                info!("Restored {} books from saved session", books.len());
                Some(books)
            }
            Some(Err(e)) => {
                error!("Saved session could not be restored: {e}");
                None
            }
            None => None,
        };
        self.cache = cache;
    }

    /// Start a search in the background and return its sequence number.
    ///
    /// Must be called from within a tokio runtime. Blank input is rejected
    /// before anything is spawned.
    pub fn submit(&mut self, text: &str) -> Result<u64, QueryError> {
        let url = build_search_url(&self.endpoint, text, self.options)?;
        self.issued += 1;
        let seq = self.issued;
        let fetcher = self.fetcher.clone();
        let sender = self.sender.clone();
        info!("Searching {url}");
        tokio::spawn(async move {
            let result = fetch_and_parse(&fetcher, url).await;
            // The receiver only goes away with the session itself.
            let _ = sender.send(Completion { seq, result });
        });
        Ok(seq)
    }

    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.receiver.recv().await
    }

    pub fn try_completion(&mut self) -> Option<Completion> {
        self.receiver.try_recv().ok()
    }

    pub fn apply(&mut self, completion: Completion) -> Update {
        if completion.seq < self.issued {
            debug!(
                "Dropping result of search #{} superseded by #{}",
                completion.seq, self.issued
            );
            return Update::Stale;
        }
        match completion.result {
            Ok(Fetched { raw, books }) => {
                let len = books.len();
                self.cache.last_response = Some(raw);
                self.books = Some(books);
                Update::Replaced(len)
            }
            Err(e) => {
                error!("Search #{} failed: {e}", completion.seq);
                Update::Failed(e)
            }
        }
    }

    /// Submit a search and wait until it has been applied. Completions of
    /// earlier searches that arrive first are applied (and dropped as
    /// stale) along the way.
    pub async fn search(&mut self, text: &str) -> Result<Update, QueryError> {
        let seq = self.submit(text)?;
        while let Some(completion) = self.next_completion().await {
            let ours = completion.seq == seq;
            let update = self.apply(completion);
            if ours {
                return Ok(update);
            }
        }
        unreachable!("session keeps its own sender alive")
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{error::ParseError, query::BOOK_SEARCH_URL};

    const RAW: &str = r#"{"items":[{"volumeInfo":{"title":"T","previewLink":"http://x"}}]}"#;

    fn session() -> Session {
        let fetcher = Fetcher::new(Duration::from_secs(1), Duration::from_secs(1)).unwrap();
        Session::new(fetcher, BOOK_SEARCH_URL, QueryOptions::default())
    }

    fn success(seq: u64, raw: &str) -> Completion {
        Completion {
            seq,
            result: Ok(Fetched {
                raw:   raw.into(),
                books: extract_book_list(raw).unwrap(),
            }),
        }
    }

    #[test]
    fn fresh_session_has_no_list() {
        let session = session();
        assert!(session.books().is_none());
        assert_eq!(session.cache(), &SearchCache::default());
    }

    #[test]
    fn success_replaces_list_and_cache() {
        let mut session = session();
        session.issued = 1;
        assert!(matches!(session.apply(success(1, RAW)), Update::Replaced(1)));
        assert_eq!(session.book(0).unwrap().title, "T");
        assert_eq!(session.cache().last_response.as_deref(), Some(RAW));
    }

    #[test]
    fn failure_keeps_previous_list() {
        let mut session = session();
        session.issued = 1;
        session.apply(success(1, RAW));
        session.issued = 2;
        let update = session.apply(Completion {
            seq:    2,
            result: Err(FetchError::Status(503).into()),
        });
        assert!(matches!(update, Update::Failed(SearchError::Network(FetchError::Status(503)))));
        session.issued = 3;
        let update = session.apply(Completion {
            seq:    3,
            result: Err(ParseError {
                path:    ".".into(),
                message: "missing field `items`".into(),
            }
            .into()),
        });
        assert!(matches!(update, Update::Failed(SearchError::Parse(_))));
        assert_eq!(session.books().unwrap().len(), 1);
        assert_eq!(session.cache().last_response.as_deref(), Some(RAW));
    }

    #[test]
    fn stale_completion_is_ignored() {
        let mut session = session();
        session.issued = 2;
        session.apply(success(2, RAW));
        let older = r#"{"items":[]}"#;
        assert!(matches!(session.apply(success(1, older)), Update::Stale));
        assert_eq!(session.books().unwrap().len(), 1);
        assert_eq!(session.cache().last_response.as_deref(), Some(RAW));
    }

    #[test]
    fn empty_result_is_a_list() {
        let mut session = session();
        session.issued = 1;
        assert!(matches!(session.apply(success(1, r#"{"items":[]}"#)), Update::Replaced(0)));
        assert_eq!(session.books(), Some(&[][..]));
    }

    #[test]
    fn restore_replays_cache() {
        let mut session = session();
        session.restore(SearchCache::new(RAW));
        assert_eq!(session.books().unwrap(), &[Book::new("T", vec![], "", "http://x", None)]);
    }

    #[test]
    fn restore_from_bad_cache_has_no_list() {
        let mut session = session();
        session.restore(SearchCache::new("{}"));
        assert!(session.books().is_none());
        session.restore(SearchCache::default());
        assert!(session.books().is_none());
    }

    #[tokio::test]
    async fn blank_query_spawns_nothing() {
        let mut session = session();
        assert!(matches!(session.submit("   "), Err(QueryError::EmptyQuery)));
        assert!(matches!(session.search("").await, Err(QueryError::EmptyQuery)));
        assert_eq!(session.issued, 0);
        assert!(session.try_completion().is_none());
    }
}
