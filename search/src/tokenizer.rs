//! Keyword and query normalization.

use crate::config::TokenizerConfig;
use nucleo::chars;

#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    config: TokenizerConfig,
}

impl Tokenizer {
    pub fn new(config: TokenizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Lower-cases, trims and collapses whitespace runs to a single space.
    pub fn normalize(&self, text: &str) -> String {
        let mut normalized = String::with_capacity(text.len());
        for word in text.split_whitespace() {
            if !normalized.is_empty() {
                normalized.push(' ');
            }
            normalized.extend(word.chars().map(|c| self.fold(c)));
        }
        normalized
    }

    /// Lazily splits `text` into normalized tokens.
    ///
    /// The iterator is `Clone`, so a sequence can be restarted from any point.
    pub fn tokens<'a>(&'a self, text: &'a str) -> Tokens<'a> {
        Tokens {
            tokenizer: self,
            rest: text,
        }
    }

    fn fold(&self, c: char) -> char {
        let c = chars::to_lower_case(c);
        if self.config.unicode_normalization {
            chars::normalize(c)
        } else {
            c
        }
    }

    fn is_separator(&self, c: char) -> bool {
        c.is_whitespace() || self.config.separators.contains(&c)
    }
}

#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    tokenizer: &'a Tokenizer,
    rest: &'a str,
}

impl Iterator for Tokens<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let tokenizer = self.tokenizer;
        let start = self.rest.trim_start_matches(|c: char| tokenizer.is_separator(c));
        if start.is_empty() {
            self.rest = start;
            return None;
        }

        let end = start
            .find(|c: char| tokenizer.is_separator(c))
            .unwrap_or(start.len());
        let (word, rest) = start.split_at(end);
        self.rest = rest;

        Some(word.chars().map(|c| tokenizer.fold(c)).collect())
    }
}
