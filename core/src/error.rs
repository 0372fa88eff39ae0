use thiserror::Error;

/// A single item handed over by a source could not be indexed.
///
/// Item errors are local: the item is skipped and the rebuild continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid item id: {0:?}")]
    InvalidId(String),

    #[error("item {0} has no keywords")]
    NoKeywords(String),
}

/// An item source failed to enumerate its items.
///
/// The rebuild is abandoned and the last published generation stays in place.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("process crashed")]
    Crashed,

    #[error("exit code is {0}")]
    ExitCode(i32),

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("schema violation: {0}")]
    Schema(String),

    #[error("interface id '{found}' does not match '{expected}'")]
    InterfaceMismatch { expected: String, found: String },
}

#[derive(Error, Debug)]
pub enum ActionError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("clipboard error: {0}")]
    Clipboard(String),
}
