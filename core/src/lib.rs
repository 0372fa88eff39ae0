pub mod error;
pub mod types;

pub use error::{ActionError, SourceError, ValidationError};
