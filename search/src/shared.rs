//! The published generation, as seen by queries.

use crate::index::OfflineIndex;
use crate::results::Match;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Holds the currently published index generation.
///
/// Readers clone the `Arc` under a short read lock and search without any
/// lock held; a rebuild swaps in a complete generation under a short write
/// lock. A generation is never mutated once published, and is dropped when
/// the last in-flight search holding it finishes.
pub struct SharedIndex<P> {
    current: RwLock<Arc<OfflineIndex<P>>>,
    fuzzy: AtomicBool,
}

impl<P> Default for SharedIndex<P> {
    fn default() -> Self {
        Self::new(OfflineIndex::default())
    }
}

impl<P> SharedIndex<P> {
    pub fn new(initial: OfflineIndex<P>) -> Self {
        let fuzzy = initial.fuzzy();
        Self {
            current: RwLock::new(Arc::new(initial)),
            fuzzy: AtomicBool::new(fuzzy),
        }
    }

    /// The generation visible right now.
    pub fn snapshot(&self) -> Arc<OfflineIndex<P>> {
        Arc::clone(&self.current.read())
    }

    /// Replaces the visible generation, returning the previous one.
    pub fn publish(&self, generation: OfflineIndex<P>) -> Arc<OfflineIndex<P>> {
        let generation = Arc::new(generation);
        std::mem::replace(&mut *self.current.write(), generation)
    }

    pub fn fuzzy(&self) -> bool {
        self.fuzzy.load(Ordering::Relaxed)
    }

    /// Applies to every search started afterwards, on any generation.
    pub fn set_fuzzy(&self, fuzzy: bool) {
        self.fuzzy.store(fuzzy, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    pub fn search(&self, query: &str) -> Vec<Match<P>> {
        self.snapshot().search_in_mode(query, self.fuzzy())
    }

    pub fn search_limited(&self, query: &str, limit: usize) -> Vec<Match<P>> {
        let mut matches = self.search(query);
        matches.truncate(limit);
        matches
    }
}
