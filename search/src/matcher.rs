//! Token-against-token scoring.
//!
//! Both sides are expected to be normalized tokens as produced by the
//! [`Tokenizer`](crate::Tokenizer). Exact and prefix matches are always
//! considered; bounded edit-distance matches only in fuzzy mode.

/// Score of an exact token match.
pub const MAX_SCORE: u32 = 1 << 16;

/// Query tokens shorter than this are not compared against truncated candidates.
const MIN_TRUNCATED_FUZZY_LEN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Prefix,
    Fuzzy { distance: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenMatch {
    pub kind: MatchKind,
    pub score: u32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher {
    fuzzy: bool,
}

impl Matcher {
    pub fn new(fuzzy: bool) -> Self {
        Self { fuzzy }
    }

    pub fn is_fuzzy(&self) -> bool {
        self.fuzzy
    }

    /// Scores `candidate` against `query`, `None` when they don't match.
    pub fn score(&self, query: &str, candidate: &str) -> Option<u32> {
        self.match_token(query, candidate).map(|m| m.score)
    }

    pub fn match_token(&self, query: &str, candidate: &str) -> Option<TokenMatch> {
        if query.is_empty() || candidate.is_empty() {
            return None;
        }

        if query == candidate {
            return Some(TokenMatch {
                kind: MatchKind::Exact,
                score: MAX_SCORE,
            });
        }

        if candidate.starts_with(query) {
            return Some(TokenMatch {
                kind: MatchKind::Prefix,
                score: prefix_score(query.chars().count(), candidate.chars().count()),
            });
        }

        if !self.fuzzy {
            return None;
        }

        let query: Vec<char> = query.chars().collect();
        let candidate: Vec<char> = candidate.chars().collect();
        let max = fuzzy_threshold(query.len());

        let whole = damerau_levenshtein_within(&query, &candidate, max);
        let truncated = if query.len() >= MIN_TRUNCATED_FUZZY_LEN && candidate.len() > query.len() {
            damerau_levenshtein_within(&query, &candidate[..query.len()], max)
        } else {
            None
        };

        let distance = match (whole, truncated) {
            (Some(a), Some(b)) => a.min(b),
            (Some(d), None) | (None, Some(d)) => d,
            (None, None) => return None,
        };

        Some(TokenMatch {
            kind: MatchKind::Fuzzy { distance },
            score: fuzzy_score(query.len(), candidate.len(), distance),
        })
    }
}

/// Largest edit distance accepted for a query token of `query_len` chars.
pub fn fuzzy_threshold(query_len: usize) -> usize {
    (query_len / 4).max(1)
}

fn prefix_score(query_len: usize, candidate_len: usize) -> u32 {
    let score = u64::from(MAX_SCORE) * query_len as u64 / candidate_len.max(1) as u64;
    score.clamp(1, u64::from(MAX_SCORE)) as u32
}

// Always below MAX_SCORE / 2 for distance >= 1.
fn fuzzy_score(query_len: usize, candidate_len: usize, distance: usize) -> u32 {
    let matched = query_len.saturating_sub(distance).max(1) as u64;
    let base = u64::from(MAX_SCORE) * matched / query_len.max(candidate_len).max(1) as u64;
    (base / (distance as u64 + 1)).max(1) as u32
}

/// Optimal string alignment distance between `a` and `b`, if it is at most `max`.
///
/// Adjacent transpositions count as one edit. Returns early once the length
/// difference or a whole DP row exceeds `max`.
pub fn damerau_levenshtein_within(a: &[char], b: &[char], max: usize) -> Option<usize> {
    if a.len().abs_diff(b.len()) > max {
        return None;
    }
    if a.is_empty() || b.is_empty() {
        return Some(a.len().max(b.len()));
    }

    let width = b.len() + 1;
    let mut before: Vec<usize> = vec![0; width];
    let mut prev: Vec<usize> = (0..width).collect();
    let mut curr: Vec<usize> = vec![0; width];

    for i in 1..=a.len() {
        curr[0] = i;
        let mut row_min = curr[0];

        for j in 1..width {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut value = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                value = value.min(before[j - 2] + 1);
            }
            curr[j] = value;
            row_min = row_min.min(value);
        }

        if row_min > max {
            return None;
        }

        std::mem::swap(&mut before, &mut prev);
        std::mem::swap(&mut prev, &mut curr);
    }

    let distance = prev[b.len()];
    (distance <= max).then_some(distance)
}
