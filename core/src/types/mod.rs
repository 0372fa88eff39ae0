pub mod config;
mod entry;
mod item;
mod item_id;
mod keyword;

pub use config::AppConfig;
pub use entry::{Action, Entry};
pub use item::IndexItem;
pub use item_id::ItemId;
pub use keyword::{MAX_WEIGHT, WeightedKeyword};
