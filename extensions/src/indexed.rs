//! A query handler answering from its own background-built offline index.

use crate::query::{Proposal, Query, QueryHandler};
use lantern_core::types::Entry;
use lantern_core::types::config::SearchConfig;
use lantern_search::{
    BackgroundIndexer, IndexerStatus, ItemSource, OfflineIndex, SharedIndex, StatusNotify,
    Tokenizer, TokenizerConfig,
};
use std::sync::Arc;

/// Offline index plus the indexer that keeps it fresh.
///
/// Queries search the generation published last, so they never wait for
/// a rebuild.
pub struct IndexedExtension {
    id: String,
    noun: String,
    limit: usize,
    index: Arc<SharedIndex<Entry>>,
    indexer: BackgroundIndexer<Entry>,
}

impl IndexedExtension {
    /// `noun` names the items in status lines, e.g. `"bookmarks"`.
    pub fn new(
        id: impl Into<String>,
        noun: impl Into<String>,
        search: &SearchConfig,
        fuzzy: bool,
        source: Arc<dyn ItemSource<Entry>>,
        notify: StatusNotify,
    ) -> Self {
        let id = id.into();
        let tokenizer = Tokenizer::new(TokenizerConfig::from(search));
        let index = Arc::new(SharedIndex::new(
            OfflineIndex::new(tokenizer).with_fuzzy(fuzzy),
        ));
        let indexer = BackgroundIndexer::new(id.clone(), Arc::clone(&index), source, notify);

        Self {
            id,
            noun: noun.into(),
            limit: search.result_limit,
            index,
            indexer,
        }
    }

    /// Returns false if a rebuild is already running.
    pub fn start_indexing(&self) -> bool {
        self.indexer.start_indexing()
    }

    pub fn set_source(&self, source: Arc<dyn ItemSource<Entry>>) {
        self.indexer.set_source(source);
    }

    pub fn fuzzy(&self) -> bool {
        self.index.fuzzy()
    }

    /// Applies from the next query on, without a rebuild.
    pub fn set_fuzzy(&self, fuzzy: bool) {
        self.index.set_fuzzy(fuzzy);
    }

    pub fn index(&self) -> &Arc<SharedIndex<Entry>> {
        &self.index
    }

    pub fn indexer(&self) -> &BackgroundIndexer<Entry> {
        &self.indexer
    }

    pub fn last_status(&self) -> IndexerStatus {
        self.indexer.last_status()
    }

    /// User-visible status line.
    pub fn status(&self) -> String {
        self.indexer.last_status().describe(&self.noun)
    }
}

impl QueryHandler for IndexedExtension {
    fn id(&self) -> &str {
        &self.id
    }

    fn handle_query(&self, query: &Query) -> Vec<Proposal> {
        self.index
            .search_limited(query.search_term(), self.limit)
            .into_iter()
            .map(Proposal::from)
            .collect()
    }
}
