//! Test doubles shared by the extension tests.

use crate::desktop::Desktop;
use lantern_core::error::ActionError;
use lantern_search::{IndexerStatus, StatusNotify};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    OpenUrl(String),
    OpenPath(PathBuf),
    Launch(String, Vec<String>),
    CopyText(String),
    CopyFiles(Vec<PathBuf>),
}

/// Records every request instead of touching the desktop.
#[derive(Default)]
pub(crate) struct RecordingDesktop {
    calls: Mutex<Vec<Call>>,
}

impl RecordingDesktop {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn record(&self, call: Call) -> Result<(), ActionError> {
        self.calls.lock().push(call);
        Ok(())
    }
}

impl Desktop for RecordingDesktop {
    fn open_url(&self, url: &str) -> Result<(), ActionError> {
        self.record(Call::OpenUrl(url.to_string()))
    }

    fn open_path(&self, path: &Path) -> Result<(), ActionError> {
        self.record(Call::OpenPath(path.to_path_buf()))
    }

    fn launch(&self, program: &str, args: &[String]) -> Result<(), ActionError> {
        self.record(Call::Launch(program.to_string(), args.to_vec()))
    }

    fn copy_text(&self, text: &str) -> Result<(), ActionError> {
        self.record(Call::CopyText(text.to_string()))
    }

    fn copy_files(&self, paths: &[PathBuf]) -> Result<(), ActionError> {
        self.record(Call::CopyFiles(paths.to_vec()))
    }
}

pub(crate) fn status_channel() -> (StatusNotify, Receiver<IndexerStatus>) {
    let (tx, rx) = mpsc::channel();
    let notify: StatusNotify = Arc::new(move |status: &IndexerStatus| {
        let _ = tx.send(status.clone());
    });
    (notify, rx)
}

/// Blocks until a rebuild finished or failed.
pub(crate) fn wait_for_completion(statuses: &Receiver<IndexerStatus>) -> IndexerStatus {
    loop {
        let status = statuses
            .recv_timeout(Duration::from_secs(10))
            .expect("indexer did not report completion");
        if !matches!(status, IndexerStatus::Indexing | IndexerStatus::Pending) {
            return status;
        }
    }
}
