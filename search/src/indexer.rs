//! Background (re)building of an offline index.

use crate::index::OfflineIndex;
use crate::shared::SharedIndex;
use crate::source::ItemSource;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Receives every status change, in order, on the thread that caused it.
/// Must not call back into the indexer's `start_indexing`.
pub type StatusNotify = Arc<dyn Fn(&IndexerStatus) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexerState {
    Idle,
    Running,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexerStatus {
    /// No rebuild has been requested yet.
    Pending,
    Indexing,
    Indexed { items: usize, skipped: usize },
    /// The previous generation is still published.
    Failed { message: String },
}

impl IndexerStatus {
    /// Status line naming what is indexed, e.g. `"42 bookmarks indexed."`.
    pub fn describe(&self, noun: &str) -> String {
        match self {
            Self::Pending => String::new(),
            Self::Indexing => format!("Indexing {noun} ..."),
            Self::Indexed { items, .. } => format!("{items} {noun} indexed."),
            Self::Failed { message } => format!("Indexing {noun} failed: {message}"),
        }
    }
}

impl fmt::Display for IndexerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe("items"))
    }
}

enum Request {
    Rebuild,
    Shutdown,
}

struct Shared<P> {
    id: String,
    index: Arc<SharedIndex<P>>,
    source: Mutex<Arc<dyn ItemSource<P>>>,
    running: AtomicBool,
    /// Serializes running-flag flips with their status change and notification.
    transition: Mutex<()>,
    status: Mutex<IndexerStatus>,
    notify: StatusNotify,
}

/// Rebuilds an index from an [`ItemSource`] on a dedicated worker thread.
///
/// At most one rebuild runs at a time; a request arriving while one is
/// running is dropped. A finished rebuild is published atomically through
/// the [`SharedIndex`]; a failed one leaves the last good generation alone.
pub struct BackgroundIndexer<P: Send + Sync + 'static> {
    shared: Arc<Shared<P>>,
    requests: Sender<Request>,
    worker: Option<JoinHandle<()>>,
}

impl<P: Send + Sync + 'static> BackgroundIndexer<P> {
    pub fn new(
        id: impl Into<String>,
        index: Arc<SharedIndex<P>>,
        source: Arc<dyn ItemSource<P>>,
        notify: StatusNotify,
    ) -> Self {
        let (requests, request_rx) = mpsc::channel::<Request>();

        let shared = Arc::new(Shared {
            id: id.into(),
            index,
            source: Mutex::new(source),
            running: AtomicBool::new(false),
            transition: Mutex::new(()),
            status: Mutex::new(IndexerStatus::Pending),
            notify,
        });

        let worker_shared = Arc::clone(&shared);
        let worker = thread::spawn(move || worker_loop(worker_shared, request_rx));

        Self {
            shared,
            requests,
            worker: Some(worker),
        }
    }

    pub fn id(&self) -> &str {
        &self.shared.id
    }

    pub fn index(&self) -> &Arc<SharedIndex<P>> {
        &self.shared.index
    }

    /// Requests a rebuild. Returns false if one is already running.
    pub fn start_indexing(&self) -> bool {
        let _transition = self.shared.transition.lock();
        if self
            .shared
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("[{}] Indexing already running, request dropped.", self.shared.id);
            return false;
        }

        self.shared.set_status(IndexerStatus::Indexing);

        if self.requests.send(Request::Rebuild).is_err() {
            warn!("[{}] Indexer worker is gone.", self.shared.id);
            self.shared.running.store(false, Ordering::Release);
            return false;
        }
        true
    }

    /// Replaces the source used by the next rebuild.
    pub fn set_source(&self, source: Arc<dyn ItemSource<P>>) {
        *self.shared.source.lock() = source;
    }

    pub fn state(&self) -> IndexerState {
        if self.shared.running.load(Ordering::Acquire) {
            IndexerState::Running
        } else {
            IndexerState::Idle
        }
    }

    pub fn last_status(&self) -> IndexerStatus {
        self.shared.status.lock().clone()
    }
}

impl<P: Send + Sync + 'static> Drop for BackgroundIndexer<P> {
    /// Waits for an in-flight rebuild, then stops the worker.
    fn drop(&mut self) {
        let _ = self.requests.send(Request::Shutdown);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn worker_loop<P>(shared: Arc<Shared<P>>, requests: Receiver<Request>) {
    for request in requests {
        match request {
            Request::Rebuild => shared.rebuild(),
            Request::Shutdown => break,
        }
    }
}

impl<P> Shared<P> {
    fn rebuild(&self) {
        let status = panic::catch_unwind(AssertUnwindSafe(|| self.build_generation()))
            .unwrap_or_else(|_| {
                warn!("[{}] Indexing source panicked.", self.id);
                IndexerStatus::Failed {
                    message: "source panicked".to_string(),
                }
            });

        let _transition = self.transition.lock();
        self.running.store(false, Ordering::Release);
        self.set_status(status);
    }

    fn build_generation(&self) -> IndexerStatus {
        let source = Arc::clone(&*self.source.lock());
        debug!(
            "[{}] Start indexing {} in background thread.",
            self.id,
            source.name()
        );

        let records = match source.collect() {
            Ok(records) => records,
            Err(err) => {
                warn!("[{}] Indexing {} failed: {}", self.id, source.name(), err);
                return IndexerStatus::Failed {
                    message: err.to_string(),
                };
            }
        };

        let mut generation: OfflineIndex<P> = self.index.snapshot().empty_like();
        let mut seen = HashSet::new();
        let mut skipped = 0;
        for record in records {
            match record.into_item() {
                Ok(item) => {
                    if seen.insert(item.id().clone()) {
                        generation.add(Arc::new(item));
                    } else {
                        skipped += 1;
                        warn!("[{}] Skipping item: duplicate id {}", self.id, item.id());
                    }
                }
                Err(err) => {
                    skipped += 1;
                    warn!("[{}] Skipping item: {}", self.id, err);
                }
            }
        }

        let items = generation.len();
        self.index.publish(generation);
        info!("[{}] Indexing done ({} items).", self.id, items);

        IndexerStatus::Indexed { items, skipped }
    }

    fn set_status(&self, status: IndexerStatus) {
        *self.status.lock() = status.clone();
        (self.notify)(&status);
    }
}
