mod app;

pub use app::{
    AppConfig, AppConfigError, BookmarksConfig, DEFAULT_SEPARATORS, ExternalConfig,
    ExternalExtensionConfig, FilesConfig, SearchConfig,
};
