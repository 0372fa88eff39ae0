//! Firefox profile discovery through profiles.ini.

use lantern_core::error::SourceError;
use std::path::{Path, PathBuf};

const DATABASE_FILE: &str = "places.sqlite";

/// One `[Profile*]` section that names a profile directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Section name, e.g. `Profile0`.
    pub id: String,
    pub name: Option<String>,
    /// Absolute profile directory.
    pub path: PathBuf,
    pub is_default: bool,
}

impl Profile {
    /// `"name (id)"`, or just the id for unnamed profiles.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{} ({})", name, self.id),
            None => self.id.clone(),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.path.join(DATABASE_FILE)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfilesIni {
    profiles: Vec<Profile>,
}

impl ProfilesIni {
    /// Looks in the usual per-platform locations.
    pub fn locate() -> Option<PathBuf> {
        let candidates = [
            dirs::home_dir().map(|home| home.join(".mozilla/firefox/profiles.ini")),
            dirs::data_dir().map(|data| data.join("Mozilla/Firefox/profiles.ini")),
            dirs::config_dir().map(|config| config.join("Firefox/profiles.ini")),
        ];
        candidates.into_iter().flatten().find(|path| path.is_file())
    }

    pub fn load(path: &Path) -> Result<Self, SourceError> {
        let text = std::fs::read_to_string(path)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(Self::parse(&text, base))
    }

    /// Parses the ini text; relative profile paths resolve against `base`.
    ///
    /// Sections without a `Path` key (`[General]`, `[Install*]`) are not
    /// profiles and are ignored.
    pub fn parse(text: &str, base: &Path) -> Self {
        let mut sections: Vec<(String, Vec<(String, String)>)> = Vec::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }
            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                sections.push((name.trim().to_string(), Vec::new()));
                continue;
            }
            if let (Some((key, value)), Some((_, entries))) = (line.split_once('='), sections.last_mut())
            {
                entries.push((key.trim().to_string(), value.trim().to_string()));
            }
        }

        let profiles = sections
            .into_iter()
            .filter_map(|(id, entries)| {
                let get = |key: &str| {
                    entries
                        .iter()
                        .rev()
                        .find(|(k, _)| k.eq_ignore_ascii_case(key))
                        .map(|(_, v)| v.as_str())
                };

                let raw_path = get("Path")?;
                let path = if get("IsRelative").is_some_and(parse_bool) {
                    base.join(raw_path)
                } else {
                    PathBuf::from(raw_path)
                };

                Some(Profile {
                    name: get("Name").map(str::to_string),
                    is_default: get("Default").is_some_and(parse_bool),
                    path,
                    id,
                })
            })
            .collect();

        Self { profiles }
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn get(&self, id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    /// Picks the profile to index.
    ///
    /// `preferred` wins if it exists. Otherwise the last used profile
    /// (`Default=1`), then a profile named `default`, then the first one.
    pub fn select(&self, preferred: Option<&str>) -> Option<&Profile> {
        preferred
            .and_then(|id| self.get(id))
            .or_else(|| self.profiles.iter().find(|p| p.is_default))
            .or_else(|| self.get("default"))
            .or_else(|| self.profiles.first())
    }
}

fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}
