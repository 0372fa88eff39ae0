//! Local file search.

use crate::desktop::Desktop;
use crate::indexed::IndexedExtension;
use crate::query::{Proposal, Query, QueryHandler};
use ignore::WalkBuilder;
use lantern_core::error::SourceError;
use lantern_core::types::config::{FilesConfig, SearchConfig};
use lantern_core::types::{Action, Entry, MAX_WEIGHT, WeightedKeyword};
use lantern_search::{IndexerStatus, ItemSource, SourceRecord, StatusNotify};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

pub const FILES_ID: &str = "org.lantern.extension.files";

const DIRECTORY_ICON: &str = "inode-directory";
const FILE_ICON: &str = "unknown";

/// Walks the configured roots and yields one item per file or directory.
pub struct FileSource {
    roots: Vec<PathBuf>,
    max_depth: usize,
    index_hidden: bool,
    desktop: Arc<dyn Desktop>,
}

impl FileSource {
    pub fn new(config: &FilesConfig, desktop: Arc<dyn Desktop>) -> Self {
        Self {
            roots: config.roots.clone(),
            max_depth: config.max_depth,
            index_hidden: config.index_hidden,
            desktop,
        }
    }

    fn record(&self, path: &Path, is_dir: bool) -> Option<SourceRecord<Entry>> {
        let name = path.file_name()?.to_string_lossy().into_owned();

        let mut keywords = vec![WeightedKeyword::new(name.clone(), MAX_WEIGHT)];
        let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned());
        if let Some(stem) = stem.filter(|stem| *stem != name) {
            keywords.push(WeightedKeyword::new(stem, MAX_WEIGHT));
        }
        if let Some(parent) = path.parent().and_then(Path::file_name) {
            keywords.push(WeightedKeyword::new(
                parent.to_string_lossy().into_owned(),
                MAX_WEIGHT / 4,
            ));
        }

        let display = path.to_string_lossy().into_owned();
        let entry = Entry::new(name, display.clone())
            .with_icon(if is_dir { DIRECTORY_ICON } else { FILE_ICON })
            .with_actions(file_actions(&self.desktop, path));
        Some(SourceRecord::new(display, keywords, entry))
    }
}

fn file_actions(desktop: &Arc<dyn Desktop>, path: &Path) -> Vec<Action> {
    let open = {
        let desktop = Arc::clone(desktop);
        let path = path.to_path_buf();
        Action::new("Open with default application", move || desktop.open_path(&path))
    };
    let reveal = {
        let desktop = Arc::clone(desktop);
        let dir = path.parent().unwrap_or(path).to_path_buf();
        Action::new("Reveal in default file browser", move || desktop.open_path(&dir))
    };
    let copy = {
        let desktop = Arc::clone(desktop);
        let path = path.to_path_buf();
        Action::new("Copy to clipboard", move || {
            desktop.copy_files(std::slice::from_ref(&path))
        })
    };
    let copy_path = {
        let desktop = Arc::clone(desktop);
        let text = path.to_string_lossy().into_owned();
        Action::new("Copy path to clipboard", move || desktop.copy_text(&text))
    };
    vec![open, reveal, copy, copy_path]
}

impl ItemSource<Entry> for FileSource {
    fn name(&self) -> &str {
        "files"
    }

    fn collect(&self) -> Result<Vec<SourceRecord<Entry>>, SourceError> {
        let mut records = Vec::new();

        for root in &self.roots {
            if !root.is_dir() {
                warn!("[{}] Skipping missing root {}.", FILES_ID, root.display());
                continue;
            }

            let walker = WalkBuilder::new(root)
                .max_depth(Some(self.max_depth))
                .hidden(!self.index_hidden)
                .git_ignore(false)
                .git_global(false)
                .git_exclude(false)
                .ignore(false)
                .parents(false)
                .sort_by_file_name(|a, b| a.cmp(b))
                .build();

            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        debug!("[{}] {}", FILES_ID, err);
                        continue;
                    }
                };
                if entry.depth() == 0 {
                    continue;
                }
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                records.extend(self.record(entry.path(), is_dir));
            }
        }

        Ok(records)
    }
}

/// File search over the configured roots.
pub struct FilesExtension {
    inner: IndexedExtension,
}

impl FilesExtension {
    pub fn new(
        config: &FilesConfig,
        search: &SearchConfig,
        desktop: Arc<dyn Desktop>,
        notify: StatusNotify,
    ) -> Self {
        let source = Arc::new(FileSource::new(config, desktop));
        Self {
            inner: IndexedExtension::new(FILES_ID, "files", search, config.fuzzy, source, notify),
        }
    }

    pub fn start_indexing(&self) -> bool {
        self.inner.start_indexing()
    }

    pub fn set_fuzzy(&self, fuzzy: bool) {
        self.inner.set_fuzzy(fuzzy);
    }

    pub fn last_status(&self) -> IndexerStatus {
        self.inner.last_status()
    }

    pub fn status(&self) -> String {
        self.inner.status()
    }
}

impl QueryHandler for FilesExtension {
    fn id(&self) -> &str {
        FILES_ID
    }

    fn handle_query(&self, query: &Query) -> Vec<Proposal> {
        self.inner.handle_query(query)
    }
}
