//! Launcher extensions built on the offline index.
//!
//! Every extension is a [`QueryHandler`]. Bookmarks and files search their own
//! offline index, rebuilt in the background; external extensions either
//! answer each query themselves or feed an offline index through `INDEX`.

pub mod bookmarks;
mod debounce;
pub mod desktop;
pub mod external;
pub mod files;
mod indexed;
mod query;

#[cfg(test)]
mod testing;

pub use debounce::Debouncer;
pub use desktop::{Desktop, SystemDesktop};
pub use indexed::IndexedExtension;
pub use query::{Proposal, Query, QueryHandler, run_query};
