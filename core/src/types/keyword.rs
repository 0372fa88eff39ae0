use serde::{Deserialize, Serialize};

/// Upper end of the weight scale used by the bundled extensions.
///
/// The index itself accepts any `u32`; this only anchors the conventions
/// (`MAX_WEIGHT`, `MAX_WEIGHT / 2`, `MAX_WEIGHT / 4`) that extensions use
/// for primary and derived keywords.
pub const MAX_WEIGHT: u32 = u16::MAX as u32;

/// A keyword string and its relative importance.
///
/// Weights are compared as integers at match time and never normalized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeightedKeyword {
    pub text: String,
    pub weight: u32,
}

impl WeightedKeyword {
    pub fn new(text: impl Into<String>, weight: u32) -> Self {
        Self {
            text: text.into(),
            weight,
        }
    }

    pub(crate) fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
