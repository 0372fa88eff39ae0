//! Search result types.

use lantern_core::types::IndexItem;
use std::fmt;
use std::sync::Arc;

/// One ranked search hit.
///
/// Holds the item through shared ownership, so it stays valid after the
/// generation it came from has been replaced.
pub struct Match<P> {
    pub item: Arc<IndexItem<P>>,
    pub score: u64,
}

impl<P> Clone for Match<P> {
    fn clone(&self) -> Self {
        Self {
            item: Arc::clone(&self.item),
            score: self.score,
        }
    }
}

impl<P> fmt::Debug for Match<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Match")
            .field("id", self.item.id())
            .field("score", &self.score)
            .finish()
    }
}
