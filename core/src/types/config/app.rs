use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Punctuation that splits keywords into tokens, on top of whitespace.
pub const DEFAULT_SEPARATORS: &str = "-_./\\:,;";

/// User-facing launcher configuration, persisted as config.toml.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub bookmarks: BookmarksConfig,
    #[serde(default)]
    pub files: FilesConfig,
    #[serde(default)]
    pub external: ExternalConfig,
}

impl AppConfig {
    /// Returns the config file path within the given data directory.
    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join("config.toml")
    }

    /// Loads config from a TOML file. Returns default config if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, AppConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Loads config, falling back to defaults instead of failing.
    ///
    /// An unreadable or unparsable file yields the default config; individual
    /// invalid values are replaced by their defaults.
    pub fn load_or_default(path: &Path) -> Self {
        let config = match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!(
                    "[config] Could not load {}: {}. Using defaults.",
                    path.display(),
                    err
                );
                return Self::default();
            }
        };

        for problem in config.validate() {
            warn!("[config] {}. Using the default value.", problem);
        }
        config.with_defaults_for_invalid()
    }

    /// Saves config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), AppConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validates config values and returns list of validation errors.
    /// Returns empty vec if config is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.search.result_limit == 0 {
            errors.push("search.result_limit must be at least 1".to_string());
        }

        if self.search.separators.chars().any(char::is_alphanumeric) {
            errors.push("search.separators must not contain letters or digits".to_string());
        }

        if self.bookmarks.update_delay_ms == 0 {
            errors.push("bookmarks.update_delay_ms must be at least 1".to_string());
        }

        if self.files.max_depth == 0 {
            errors.push("files.max_depth must be at least 1".to_string());
        }

        for extension in &self.external.extensions {
            if !extension.is_valid() {
                errors.push(format!(
                    "external extension {:?} needs a non-empty id and path",
                    extension.id
                ));
            }
        }

        errors
    }

    /// Returns a validated config, replacing invalid values with defaults.
    pub fn with_defaults_for_invalid(&self) -> Self {
        let defaults = Self::default();
        Self {
            search: SearchConfig {
                separators: if self.search.separators.chars().any(char::is_alphanumeric) {
                    defaults.search.separators
                } else {
                    self.search.separators.clone()
                },
                unicode_normalization: self.search.unicode_normalization,
                result_limit: if self.search.result_limit == 0 {
                    defaults.search.result_limit
                } else {
                    self.search.result_limit
                },
            },
            bookmarks: BookmarksConfig {
                update_delay_ms: if self.bookmarks.update_delay_ms == 0 {
                    defaults.bookmarks.update_delay_ms
                } else {
                    self.bookmarks.update_delay_ms
                },
                ..self.bookmarks.clone()
            },
            files: FilesConfig {
                max_depth: if self.files.max_depth == 0 {
                    defaults.files.max_depth
                } else {
                    self.files.max_depth
                },
                ..self.files.clone()
            },
            external: ExternalConfig {
                fuzzy: self.external.fuzzy,
                extensions: self
                    .external
                    .extensions
                    .iter()
                    .filter(|e| e.is_valid())
                    .cloned()
                    .collect(),
            },
        }
    }
}

/// Tokenization and result settings shared by every offline index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_separators")]
    pub separators: String,
    #[serde(default = "default_true")]
    pub unicode_normalization: bool,
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            separators: default_separators(),
            unicode_normalization: true,
            result_limit: default_result_limit(),
        }
    }
}

/// Browser bookmark extension settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BookmarksConfig {
    #[serde(default)]
    pub fuzzy: bool,
    /// Profile id as listed in profiles.ini. Unknown ids fall back to the default profile.
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub open_with_firefox: bool,
    /// Overrides the profiles.ini lookup.
    #[serde(default)]
    pub profiles_ini: Option<PathBuf>,
    #[serde(default = "default_update_delay_ms")]
    pub update_delay_ms: u64,
}

impl Default for BookmarksConfig {
    fn default() -> Self {
        Self {
            fuzzy: false,
            profile: None,
            open_with_firefox: false,
            profiles_ini: None,
            update_delay_ms: default_update_delay_ms(),
        }
    }
}

/// File indexing settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilesConfig {
    #[serde(default)]
    pub fuzzy: bool,
    #[serde(default = "default_roots")]
    pub roots: Vec<PathBuf>,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default)]
    pub index_hidden: bool,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            fuzzy: false,
            roots: default_roots(),
            max_depth: default_max_depth(),
            index_hidden: false,
        }
    }
}

/// External process extensions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalConfig {
    #[serde(default)]
    pub fuzzy: bool,
    #[serde(default)]
    pub extensions: Vec<ExternalExtensionConfig>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExternalExtensionConfig {
    pub id: String,
    pub path: PathBuf,
    /// Fetch all items once through INDEX and search them offline,
    /// instead of running QUERY on every keystroke.
    #[serde(default)]
    pub offline_index: bool,
}

impl ExternalExtensionConfig {
    fn is_valid(&self) -> bool {
        !self.id.trim().is_empty() && !self.path.as_os_str().is_empty()
    }
}

fn default_separators() -> String {
    DEFAULT_SEPARATORS.to_string()
}

fn default_result_limit() -> usize {
    100
}

fn default_update_delay_ms() -> u64 {
    60_000
}

fn default_roots() -> Vec<PathBuf> {
    dirs::home_dir().into_iter().collect()
}

fn default_max_depth() -> usize {
    8
}

fn default_true() -> bool {
    true
}

/// Errors that can occur when loading or saving config.
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
