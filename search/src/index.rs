//! One generation of the offline fuzzy index.

use crate::matcher::Matcher;
use crate::results::Match;
use crate::tokenizer::Tokenizer;
use lantern_core::types::IndexItem;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Bound;
use std::sync::Arc;

/// An item's weight for one indexed token.
#[derive(Debug, Clone, Copy)]
struct Posting {
    /// Insertion ordinal, doubles as the tie-breaker.
    item: usize,
    weight: u32,
}

/// Token-indexed item collection answering prefix and fuzzy queries.
///
/// Tokens live in a sorted map, so all tokens sharing a prefix form one
/// contiguous range. Edit-distance scoring only runs against the whole
/// vocabulary when fuzzy mode is on and that range is empty.
pub struct OfflineIndex<P> {
    items: Vec<Arc<IndexItem<P>>>,
    tokens: BTreeMap<String, Vec<Posting>>,
    tokenizer: Tokenizer,
    fuzzy: bool,
}

impl<P> Default for OfflineIndex<P> {
    fn default() -> Self {
        Self::new(Tokenizer::default())
    }
}

/// Build operations.
impl<P> OfflineIndex<P> {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self {
            items: Vec::new(),
            tokens: BTreeMap::new(),
            tokenizer,
            fuzzy: false,
        }
    }

    /// An empty index with the same tokenizer and mode, used to build the next generation.
    pub fn empty_like(&self) -> Self {
        Self::new(self.tokenizer.clone()).with_fuzzy(self.fuzzy)
    }

    pub fn with_fuzzy(mut self, fuzzy: bool) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    /// Registers every token of every keyword of `item`.
    ///
    /// When several keywords of the same item produce the same token, the
    /// highest weight wins; other items are unaffected.
    pub fn add(&mut self, item: Arc<IndexItem<P>>) {
        let ordinal = self.items.len();

        let mut weights: HashMap<String, u32> = HashMap::new();
        for keyword in item.keywords() {
            for token in self.tokenizer.tokens(&keyword.text) {
                let weight = weights.entry(token).or_insert(keyword.weight);
                *weight = (*weight).max(keyword.weight);
            }
        }

        for (token, weight) in weights {
            self.tokens.entry(token).or_default().push(Posting {
                item: ordinal,
                weight,
            });
        }
        self.items.push(item);
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.tokens.clear();
    }

    /// Takes effect on the next search, no rebuild needed.
    pub fn set_fuzzy(&mut self, fuzzy: bool) {
        self.fuzzy = fuzzy;
    }
}

/// Read operations.
impl<P> OfflineIndex<P> {
    pub fn fuzzy(&self) -> bool {
        self.fuzzy
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct indexed tokens.
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    /// Items in insertion order.
    pub fn items(&self) -> impl Iterator<Item = &Arc<IndexItem<P>>> {
        self.items.iter()
    }
}

/// Search operations.
impl<P> OfflineIndex<P> {
    pub fn search(&self, query: &str) -> Vec<Match<P>> {
        self.search_in_mode(query, self.fuzzy)
    }

    pub fn search_limited(&self, query: &str, limit: usize) -> Vec<Match<P>> {
        let mut matches = self.search(query);
        matches.truncate(limit);
        matches
    }

    /// Ranks the items matching every distinct token of `query`.
    ///
    /// Per query token an item contributes its best `weight * token score`
    /// over its own tokens; contributions are summed across query tokens.
    /// Results are ordered by score, then by insertion order.
    pub fn search_in_mode(&self, query: &str, fuzzy: bool) -> Vec<Match<P>> {
        let mut seen = HashSet::new();
        let query_tokens: Vec<String> = self
            .tokenizer
            .tokens(query)
            .filter(|token| seen.insert(token.clone()))
            .collect();

        if query_tokens.is_empty() || self.items.is_empty() {
            return Vec::new();
        }

        let matcher = Matcher::new(fuzzy);
        let mut accumulated: Option<HashMap<usize, u64>> = None;

        for token in &query_tokens {
            let best = self.best_per_item(token, &matcher);

            let merged = match accumulated {
                None => best,
                Some(mut acc) => {
                    acc.retain(|item, score| match best.get(item) {
                        Some(add) => {
                            *score += add;
                            true
                        }
                        None => false,
                    });
                    acc
                }
            };

            if merged.is_empty() {
                return Vec::new();
            }
            accumulated = Some(merged);
        }

        let mut ranked: Vec<(usize, u64)> = accumulated.unwrap_or_default().into_iter().collect();
        ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

        ranked
            .into_iter()
            .map(|(ordinal, score)| Match {
                item: Arc::clone(&self.items[ordinal]),
                score,
            })
            .collect()
    }

    fn best_per_item(&self, query_token: &str, matcher: &Matcher) -> HashMap<usize, u64> {
        let mut best = HashMap::new();
        let mut has_prefix_candidates = false;

        for (candidate, postings) in self.with_prefix(query_token) {
            has_prefix_candidates = true;
            if let Some(score) = matcher.score(query_token, candidate) {
                collect_best(&mut best, postings, score);
            }
        }

        if !has_prefix_candidates && matcher.is_fuzzy() {
            for (candidate, postings) in &self.tokens {
                if let Some(score) = matcher.score(query_token, candidate) {
                    collect_best(&mut best, postings, score);
                }
            }
        }

        best
    }

    fn with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a Vec<Posting>)> + 'a {
        self.tokens
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(move |(token, _)| token.starts_with(prefix))
    }
}

fn collect_best(best: &mut HashMap<usize, u64>, postings: &[Posting], score: u32) {
    for posting in postings {
        let value = u64::from(posting.weight) * u64::from(score);
        let entry = best.entry(posting.item).or_insert(value);
        *entry = (*entry).max(value);
    }
}
