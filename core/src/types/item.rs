use super::{ItemId, WeightedKeyword};
use crate::error::ValidationError;

/// A value that can be placed into an offline index.
///
/// The payload is opaque to the index and handed back unmodified with
/// search results.
#[derive(Debug, Clone)]
pub struct IndexItem<P> {
    id: ItemId,
    keywords: Vec<WeightedKeyword>,
    payload: P,
}

impl<P> IndexItem<P> {
    /// Validates and builds an item.
    ///
    /// Keywords with blank text are dropped. An item left without any
    /// keyword is rejected, as is a blank id.
    pub fn try_new(
        id: impl Into<String>,
        keywords: Vec<WeightedKeyword>,
        payload: P,
    ) -> Result<Self, ValidationError> {
        let raw = id.into();
        let id = ItemId::try_new(raw.clone()).map_err(|_| ValidationError::InvalidId(raw))?;

        let keywords: Vec<WeightedKeyword> =
            keywords.into_iter().filter(|k| !k.is_blank()).collect();
        if keywords.is_empty() {
            return Err(ValidationError::NoKeywords(id.into_inner()));
        }

        Ok(Self {
            id,
            keywords,
            payload,
        })
    }

    pub fn id(&self) -> &ItemId {
        &self.id
    }

    pub fn keywords(&self) -> &[WeightedKeyword] {
        &self.keywords
    }

    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn into_payload(self) -> P {
        self.payload
    }
}
