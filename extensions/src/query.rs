//! What the front-end asks of every extension.

use lantern_core::types::{Entry, IndexItem};
use lantern_search::Match;
use std::sync::Arc;

/// A user query, as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    search_term: String,
}

impl Query {
    /// Surrounding whitespace is dropped.
    pub fn new(search_term: impl AsRef<str>) -> Self {
        Self {
            search_term: search_term.as_ref().trim().to_string(),
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn is_empty(&self) -> bool {
        self.search_term.is_empty()
    }

    /// The rest of the term if it starts with `trigger`.
    pub fn strip_trigger(&self, trigger: &str) -> Option<&str> {
        self.search_term.strip_prefix(trigger)
    }
}

/// One ranked result handed to the front-end.
#[derive(Debug)]
pub struct Proposal {
    pub item: Arc<IndexItem<Entry>>,
    pub score: u64,
}

impl Proposal {
    pub fn entry(&self) -> &Entry {
        self.item.payload()
    }
}

impl Clone for Proposal {
    fn clone(&self) -> Self {
        Self {
            item: Arc::clone(&self.item),
            score: self.score,
        }
    }
}

impl From<Match<Entry>> for Proposal {
    fn from(m: Match<Entry>) -> Self {
        Self {
            item: m.item,
            score: m.score,
        }
    }
}

/// An extension answering queries.
///
/// Handlers are called from the front-end thread and must not block on
/// indexing; they search whatever generation is currently published.
pub trait QueryHandler: Send + Sync {
    fn id(&self) -> &str;

    fn handle_query(&self, query: &Query) -> Vec<Proposal>;

    /// The launcher window was opened.
    fn setup_session(&self) {}

    /// The launcher window was closed.
    fn teardown_session(&self) {}
}

/// Asks every handler and merges the answers, best score first.
///
/// Proposals with equal scores keep handler order, then the order the
/// handler returned them in.
pub fn run_query(handlers: &[Arc<dyn QueryHandler>], query: &Query, limit: usize) -> Vec<Proposal> {
    if query.is_empty() {
        return Vec::new();
    }

    let mut proposals: Vec<Proposal> = handlers
        .iter()
        .flat_map(|handler| handler.handle_query(query))
        .collect();

    proposals.sort_by(|a, b| b.score.cmp(&a.score));
    proposals.truncate(limit);
    proposals
}
