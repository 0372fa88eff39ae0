use lantern_core::types::config::{DEFAULT_SEPARATORS, SearchConfig};

/// How keyword and query strings are cut into tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerConfig {
    /// Split characters on top of whitespace.
    pub separators: Vec<char>,
    /// Fold latin diacritics to their base letter (`é` matches `e`).
    pub unicode_normalization: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            separators: DEFAULT_SEPARATORS.chars().collect(),
            unicode_normalization: true,
        }
    }
}

impl From<&SearchConfig> for TokenizerConfig {
    fn from(config: &SearchConfig) -> Self {
        Self {
            separators: config.separators.chars().collect(),
            unicode_normalization: config.unicode_normalization,
        }
    }
}
