//! Slow, external producers of index items.

use lantern_core::error::{SourceError, ValidationError};
use lantern_core::types::{IndexItem, WeightedKeyword};

/// Raw item data as delivered by a source, validated by the indexer.
#[derive(Debug, Clone)]
pub struct SourceRecord<P> {
    pub id: String,
    pub keywords: Vec<WeightedKeyword>,
    pub payload: P,
}

impl<P> SourceRecord<P> {
    pub fn new(id: impl Into<String>, keywords: Vec<WeightedKeyword>, payload: P) -> Self {
        Self {
            id: id.into(),
            keywords,
            payload,
        }
    }

    pub fn into_item(self) -> Result<IndexItem<P>, ValidationError> {
        IndexItem::try_new(self.id, self.keywords, self.payload)
    }
}

/// Enumerates every item of one generation.
///
/// Called on the indexer's worker thread; may block for as long as it needs.
pub trait ItemSource<P>: Send + Sync {
    /// Short name used in log messages.
    fn name(&self) -> &str;

    fn collect(&self) -> Result<Vec<SourceRecord<P>>, SourceError>;
}
