//! Firefox bookmark search.
//!
//! Bookmarks are read from the selected profile's places database through a
//! [`BookmarkReader`] and searched offline. Database changes are debounced
//! before re-indexing.

mod profiles;

pub use profiles::{Profile, ProfilesIni};

use crate::debounce::Debouncer;
use crate::desktop::Desktop;
use crate::indexed::IndexedExtension;
use crate::query::{Proposal, Query, QueryHandler};
use lantern_core::error::SourceError;
use lantern_core::types::config::{BookmarksConfig, SearchConfig};
use lantern_core::types::{Action, Entry, MAX_WEIGHT, WeightedKeyword};
use lantern_search::{IndexerStatus, ItemSource, SourceRecord, StatusNotify};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

pub const BOOKMARKS_ID: &str = "org.lantern.extension.firefoxbookmarks";

const FIREFOX: &str = "firefox";
const BOOKMARK_ICON: &str = "www";

/// A bookmark as stored in the places database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkRow {
    pub guid: String,
    pub title: String,
    pub url: String,
    /// Title of the containing folder.
    pub parent: String,
}

/// Reads every bookmark with a title from a places database.
pub trait BookmarkReader: Send + Sync {
    fn read(&self, database: &Path) -> Result<Vec<BookmarkRow>, SourceError>;
}

/// Turns the bookmarks of one profile into index items.
pub struct BookmarkSource {
    reader: Arc<dyn BookmarkReader>,
    desktop: Arc<dyn Desktop>,
    database: Option<PathBuf>,
    open_with_firefox: bool,
}

impl BookmarkSource {
    pub fn new(
        reader: Arc<dyn BookmarkReader>,
        desktop: Arc<dyn Desktop>,
        database: Option<PathBuf>,
        open_with_firefox: bool,
    ) -> Self {
        Self {
            reader,
            desktop,
            database,
            open_with_firefox,
        }
    }

    fn record(&self, row: BookmarkRow) -> SourceRecord<Entry> {
        let mut keywords = vec![WeightedKeyword::new(row.title.clone(), MAX_WEIGHT)];
        if let Some(host) = host_without_tld(&row.url) {
            keywords.push(WeightedKeyword::new(host, MAX_WEIGHT / 2));
        }
        keywords.push(WeightedKeyword::new(row.url.clone(), MAX_WEIGHT / 4));

        let default_browser = {
            let desktop = Arc::clone(&self.desktop);
            let url = row.url.clone();
            Action::new("Open in default browser", move || desktop.open_url(&url))
        };
        let firefox = {
            let desktop = Arc::clone(&self.desktop);
            let url = row.url.clone();
            Action::new("Open in firefox", move || {
                desktop.launch(FIREFOX, std::slice::from_ref(&url))
            })
        };
        let copy = {
            let desktop = Arc::clone(&self.desktop);
            let url = row.url.clone();
            Action::new("Copy url to clipboard", move || desktop.copy_text(&url))
        };

        let actions = if self.open_with_firefox {
            vec![firefox, default_browser, copy]
        } else {
            vec![default_browser, firefox, copy]
        };

        let entry = Entry::new(row.title, row.url)
            .with_icon(BOOKMARK_ICON)
            .with_actions(actions);
        SourceRecord::new(row.guid, keywords, entry)
    }
}

impl ItemSource<Entry> for BookmarkSource {
    fn name(&self) -> &str {
        "bookmarks"
    }

    fn collect(&self) -> Result<Vec<SourceRecord<Entry>>, SourceError> {
        let database = self
            .database
            .as_deref()
            .ok_or_else(|| SourceError::Unavailable("no Firefox profile selected".to_string()))?;

        let rows = self.reader.read(database)?;
        Ok(rows
            .into_iter()
            .filter(|row| !row.title.trim().is_empty())
            .map(|row| self.record(row))
            .collect())
    }
}

/// Registry labels under a country code, as in `bbc.co.uk`.
const SECOND_LEVEL_LABELS: &[&str] = &["ac", "co", "com", "edu", "gov", "net", "org"];

/// `www.example.com` yields `www.example`, `news.bbc.co.uk` yields `news.bbc`.
/// IP hosts yield nothing. Not a full public suffix list.
fn host_without_tld(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let domain = url.domain()?;
    let Some((rest, tld)) = domain.rsplit_once('.') else {
        return Some(domain.to_string());
    };
    let host = match rest.rsplit_once('.') {
        Some((host, label)) if tld.len() == 2 && SECOND_LEVEL_LABELS.contains(&label) => host,
        _ => rest,
    };
    Some(host.to_string())
}

struct Settings {
    config: BookmarksConfig,
    database: Option<PathBuf>,
}

/// Bookmark search for one Firefox installation.
pub struct BookmarksExtension {
    profiles: ProfilesIni,
    reader: Arc<dyn BookmarkReader>,
    desktop: Arc<dyn Desktop>,
    settings: Mutex<Settings>,
    debouncer: Debouncer,
    inner: Arc<IndexedExtension>,
}

impl BookmarksExtension {
    /// Selects a profile and starts indexing it.
    pub fn new(
        config: &BookmarksConfig,
        search: &SearchConfig,
        profiles: ProfilesIni,
        reader: Arc<dyn BookmarkReader>,
        desktop: Arc<dyn Desktop>,
        notify: StatusNotify,
    ) -> Self {
        let mut config = config.clone();
        let selected = profiles.select(config.profile.as_deref()).cloned();
        match &selected {
            Some(profile) => config.profile = Some(profile.id.clone()),
            None => warn!("[{}] No Firefox profiles found.", BOOKMARKS_ID),
        }
        let database = selected.as_ref().map(Profile::database_path);

        let source = Arc::new(BookmarkSource::new(
            Arc::clone(&reader),
            Arc::clone(&desktop),
            database.clone(),
            config.open_with_firefox,
        ));
        let inner = Arc::new(IndexedExtension::new(
            BOOKMARKS_ID,
            "bookmarks",
            search,
            config.fuzzy,
            source,
            notify,
        ));

        let weak = Arc::downgrade(&inner);
        let debouncer = Debouncer::new(Duration::from_millis(config.update_delay_ms), move || {
            if let Some(inner) = weak.upgrade() {
                inner.start_indexing();
            }
        });

        if database.is_some() {
            inner.start_indexing();
        }

        Self {
            profiles,
            reader,
            desktop,
            settings: Mutex::new(Settings { config, database }),
            debouncer,
            inner,
        }
    }

    /// Locates profiles.ini (or uses the configured one) and builds the extension.
    pub fn from_config(
        config: &BookmarksConfig,
        search: &SearchConfig,
        reader: Arc<dyn BookmarkReader>,
        desktop: Arc<dyn Desktop>,
        notify: StatusNotify,
    ) -> Result<Self, SourceError> {
        let path = config
            .profiles_ini
            .clone()
            .or_else(ProfilesIni::locate)
            .ok_or_else(|| SourceError::Unavailable("could not locate profiles.ini".to_string()))?;
        let profiles = ProfilesIni::load(&path)?;
        Ok(Self::new(config, search, profiles, reader, desktop, notify))
    }

    pub fn profiles(&self) -> &[Profile] {
        self.profiles.profiles()
    }

    pub fn current_profile(&self) -> Option<String> {
        self.settings.lock().config.profile.clone()
    }

    /// The places database a file watcher should observe.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.settings.lock().database.clone()
    }

    /// Switches to `profile_id` and re-indexes. Unknown ids are ignored.
    pub fn set_profile(&self, profile_id: &str) -> bool {
        let Some(profile) = self.profiles.get(profile_id) else {
            warn!("[{}] Profile '{}' not found.", BOOKMARKS_ID, profile_id);
            return false;
        };

        {
            let mut settings = self.settings.lock();
            settings.config.profile = Some(profile.id.clone());
            settings.database = Some(profile.database_path());
        }
        info!("[{}] Using profile {}.", BOOKMARKS_ID, profile.label());
        self.rebuild();
        true
    }

    pub fn fuzzy(&self) -> bool {
        self.inner.fuzzy()
    }

    pub fn set_fuzzy(&self, fuzzy: bool) {
        self.settings.lock().config.fuzzy = fuzzy;
        self.inner.set_fuzzy(fuzzy);
    }

    /// Action order is part of the indexed items, so this re-indexes.
    pub fn set_open_with_firefox(&self, open_with_firefox: bool) {
        self.settings.lock().config.open_with_firefox = open_with_firefox;
        self.rebuild();
    }

    /// Notifies that the places database changed on disk.
    ///
    /// Indexing starts once no further change arrived for the update delay.
    pub fn database_changed(&self) {
        self.debouncer.poke();
    }

    pub fn start_indexing(&self) -> bool {
        self.inner.start_indexing()
    }

    pub fn last_status(&self) -> IndexerStatus {
        self.inner.last_status()
    }

    pub fn status(&self) -> String {
        self.inner.status()
    }

    /// Current settings, for persisting.
    pub fn config(&self) -> BookmarksConfig {
        let mut config = self.settings.lock().config.clone();
        config.fuzzy = self.inner.fuzzy();
        config
    }

    fn rebuild(&self) {
        let source = {
            let settings = self.settings.lock();
            BookmarkSource::new(
                Arc::clone(&self.reader),
                Arc::clone(&self.desktop),
                settings.database.clone(),
                settings.config.open_with_firefox,
            )
        };
        self.inner.set_source(Arc::new(source));
        self.inner.start_indexing();
    }
}

impl QueryHandler for BookmarksExtension {
    fn id(&self) -> &str {
        BOOKMARKS_ID
    }

    fn handle_query(&self, query: &Query) -> Vec<Proposal> {
        self.inner.handle_query(query)
    }
}
