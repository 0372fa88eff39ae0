//! Lantern offline fuzzy search.
//!
//! Provides the token index shared by every launcher extension.
//!
//! # Design
//!
//! - [`OfflineIndex`] is one generation: items plus a sorted token map.
//!   Queries prefix-scan the token map, and only fall back to scoring the
//!   whole vocabulary by edit distance in fuzzy mode when the prefix scan
//!   finds nothing.
//! - Generations are built wholesale and never updated in place.
//!   [`SharedIndex`] publishes them with a pointer swap; searches hold an
//!   `Arc` to the generation they started on.
//! - [`BackgroundIndexer`] runs an [`ItemSource`] on its own worker thread,
//!   at most one rebuild at a time.

mod config;
mod index;
mod indexer;
mod matcher;
mod results;
mod shared;
mod source;
mod tokenizer;

pub use config::TokenizerConfig;
pub use index::OfflineIndex;
pub use indexer::{BackgroundIndexer, IndexerState, IndexerStatus, StatusNotify};
pub use matcher::{
    MAX_SCORE, MatchKind, Matcher, TokenMatch, damerau_levenshtein_within, fuzzy_threshold,
};
pub use results::Match;
pub use shared::SharedIndex;
pub use source::{ItemSource, SourceRecord};
pub use tokenizer::{Tokenizer, Tokens};

#[cfg(test)]
mod tests;
