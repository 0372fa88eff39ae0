use nutype::nutype;

/// Stable identifier of an indexed item, unique within one index generation.
#[nutype(
    sanitize(trim),
    validate(not_empty),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        AsRef,
        Deref,
        Hash,
        Display,
        Serialize,
        Deserialize,
    )
)]
pub struct ItemId(String);
