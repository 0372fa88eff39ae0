//! Extensions implemented by external executables.
//!
//! The executable is started once per operation. The operation is passed in
//! [`OP_VAR`], the search term of a query in [`QUERY_VAR`], and every string
//! variable returned by the previous answer is passed back in the
//! environment. Calls into one extension never overlap.

mod process;
pub mod protocol;

pub use protocol::{
    ExternalAction, ExternalItem, INTERFACE_ID, Metadata, OP_VAR, Operation, QUERY_VAR, Response,
};

use crate::desktop::Desktop;
use crate::query::{Proposal, Query, QueryHandler};
use lantern_core::error::{SourceError, ValidationError};
use lantern_core::types::{Action, Entry, IndexItem, MAX_WEIGHT, WeightedKeyword};
use lantern_search::{ItemSource, SourceRecord};
use parking_lot::Mutex;
use process::run_process;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

const NOT_AVAILABLE: &str = "N/A";

/// A loaded external extension.
pub struct ExternalExtension {
    id: String,
    path: PathBuf,
    name: String,
    version: String,
    author: String,
    trigger: Option<String>,
    dependencies: Vec<String>,
    desktop: Arc<dyn Desktop>,
    /// Held for the whole process run.
    variables: Mutex<BTreeMap<String, String>>,
    /// FINALIZE is only sent after a successful INITIALIZE.
    initialized: bool,
}

impl ExternalExtension {
    /// Asks for the metadata, then initializes the extension.
    pub fn load(
        id: impl Into<String>,
        path: impl Into<PathBuf>,
        desktop: Arc<dyn Desktop>,
    ) -> Result<Self, SourceError> {
        let id = id.into();
        let path = path.into();

        let mut env = BTreeMap::new();
        env.insert(OP_VAR.to_string(), Operation::Metadata.as_str().to_string());
        let out = run_process(&path, &env).inspect_err(|err| {
            warn!("[{}] Getting metadata failed: {} ({})", id, err, path.display())
        })?;
        let metadata = protocol::parse_metadata(&out).inspect_err(|err| {
            warn!("[{}] Getting metadata failed: {} ({})", id, err, path.display())
        })?;

        let mut extension = Self {
            name: metadata.name.unwrap_or_else(|| id.clone()),
            version: metadata.version.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            author: metadata.author.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            trigger: metadata.trigger.filter(|t| !t.is_empty()),
            dependencies: metadata.dependencies,
            id,
            path,
            desktop,
            variables: Mutex::new(BTreeMap::new()),
            initialized: false,
        };

        extension.call(Operation::Initialize, None)?;
        extension.initialized = true;
        info!(
            "[{}] Loaded {} {} by {}.",
            extension.id, extension.name, extension.version, extension.author
        );
        Ok(extension)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn trigger(&self) -> Option<&str> {
        self.trigger.as_deref()
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// Variables that will be passed to the next call.
    pub fn variables(&self) -> BTreeMap<String, String> {
        self.variables.lock().clone()
    }

    /// Runs `QUERY` for `term` and returns the items in the order given.
    pub fn query(&self, term: &str) -> Result<Vec<IndexItem<Entry>>, SourceError> {
        let items = self.call_for_items(Operation::Query, Some(term))?;
        Ok(items
            .into_iter()
            .filter_map(|item| match self.query_item(item) {
                Ok(item) => Some(item),
                Err(err) => {
                    warn!("[{}] Skipping item: {}", self.id, err);
                    None
                }
            })
            .collect())
    }

    /// Runs `INDEX` and returns every item for an offline index.
    pub fn index(&self) -> Result<Vec<SourceRecord<Entry>>, SourceError> {
        let items = self.call_for_items(Operation::Index, None)?;
        Ok(items.into_iter().map(|item| self.record(item)).collect())
    }

    /// Runs `op`, replacing the stored variables with the answer's.
    fn call(&self, op: Operation, query: Option<&str>) -> Result<Option<Response>, SourceError> {
        let mut variables = self.variables.lock();

        let mut env = variables.clone();
        env.insert(OP_VAR.to_string(), op.as_str().to_string());
        if let Some(query) = query {
            env.insert(QUERY_VAR.to_string(), query.to_string());
        }

        let result = run_process(&self.path, &env)
            .and_then(|out| protocol::parse_response(op, &out));
        match result {
            Ok(response) => {
                if let Some(response) = &response {
                    *variables = response.string_variables();
                }
                Ok(response)
            }
            Err(err) => {
                warn!(
                    "[{}] {} failed: {} ({})",
                    self.id,
                    op.describe(),
                    err,
                    self.path.display()
                );
                Err(err)
            }
        }
    }

    fn call_for_items(
        &self,
        op: Operation,
        query: Option<&str>,
    ) -> Result<Vec<ExternalItem>, SourceError> {
        let items = self
            .call(op, query)?
            .and_then(|response| response.items)
            .unwrap_or_default();

        Ok(items
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<ExternalItem>(value) {
                Ok(item) => Some(item),
                Err(err) => {
                    warn!("[{}] Item is not a valid JSON object: {}", self.id, err);
                    None
                }
            })
            .collect())
    }

    fn record(&self, item: ExternalItem) -> SourceRecord<Entry> {
        let keywords = if item.keywords.is_empty() {
            vec![
                WeightedKeyword::new(item.name.clone(), MAX_WEIGHT),
                WeightedKeyword::new(item.description.clone(), MAX_WEIGHT / 4),
            ]
        } else {
            item.keywords.clone()
        };

        let actions = item
            .actions
            .into_iter()
            .map(|action| {
                let desktop = Arc::clone(&self.desktop);
                let ExternalAction {
                    name,
                    command,
                    arguments,
                } = action;
                Action::new(name, move || desktop.launch(&command, &arguments))
            })
            .collect();

        let mut entry = Entry::new(item.name, item.description).with_actions(actions);
        entry.icon = item.icon;
        SourceRecord::new(item.id, keywords, entry)
    }

    /// Query results are shown whatever their keywords, so the id stands
    /// in when nothing else is searchable.
    fn query_item(&self, item: ExternalItem) -> Result<IndexItem<Entry>, ValidationError> {
        let mut record = self.record(item);
        if record.keywords.iter().all(|k| k.text.trim().is_empty()) {
            record
                .keywords
                .push(WeightedKeyword::new(record.id.clone(), MAX_WEIGHT));
        }
        record.into_item()
    }
}

impl QueryHandler for ExternalExtension {
    fn id(&self) -> &str {
        &self.id
    }

    /// With a trigger, only queries starting with it are handled, and the
    /// trigger is stripped.
    fn handle_query(&self, query: &Query) -> Vec<Proposal> {
        let term = match &self.trigger {
            Some(trigger) => match query.strip_trigger(trigger) {
                Some(rest) => rest,
                None => return Vec::new(),
            },
            None => query.search_term(),
        };

        match self.query(term) {
            Ok(items) => items
                .into_iter()
                .map(|item| Proposal {
                    item: Arc::new(item),
                    score: 0,
                })
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    fn setup_session(&self) {
        let _ = self.call(Operation::SetupSession, None);
    }

    fn teardown_session(&self) {
        let _ = self.call(Operation::TeardownSession, None);
    }
}

impl Drop for ExternalExtension {
    fn drop(&mut self) {
        if self.initialized {
            let _ = self.call(Operation::Finalize, None);
        }
    }
}

/// Feeds an offline index from an extension's `INDEX` answer.
pub struct ExternalSource {
    extension: Arc<ExternalExtension>,
}

impl ExternalSource {
    pub fn new(extension: Arc<ExternalExtension>) -> Self {
        Self { extension }
    }
}

impl ItemSource<Entry> for ExternalSource {
    fn name(&self) -> &str {
        self.extension.id()
    }

    fn collect(&self) -> Result<Vec<SourceRecord<Entry>>, SourceError> {
        self.extension.index()
    }
}
