use super::*;
use common::{FnSource, StatusChannel, build_index, ids, item, wait_for_completion};
use lantern_core::error::SourceError;
use lantern_core::types::WeightedKeyword;
use std::sync::Arc;

mod common {
    use super::*;
    use lantern_core::types::IndexItem;
    use parking_lot::Mutex;
    use std::sync::mpsc::{self, Receiver};
    use std::time::Duration;

    pub(super) fn item(id: &str, keywords: &[(&str, u32)]) -> Arc<IndexItem<String>> {
        let keywords = keywords
            .iter()
            .map(|(text, weight)| WeightedKeyword::new(*text, *weight))
            .collect();
        Arc::new(IndexItem::try_new(id, keywords, format!("payload of {id}")).unwrap())
    }

    pub(super) fn build_index(items: &[(&str, &[(&str, u32)])]) -> OfflineIndex<String> {
        let mut index = OfflineIndex::default();
        for (id, keywords) in items {
            index.add(item(id, keywords));
        }
        index
    }

    pub(super) fn ids(matches: &[Match<String>]) -> Vec<String> {
        matches.iter().map(|m| m.item.id().to_string()).collect()
    }

    type Collect = dyn Fn() -> Result<Vec<SourceRecord<String>>, SourceError> + Send + Sync;

    pub(super) struct FnSource(pub(super) Box<Collect>);

    impl FnSource {
        pub(super) fn new<F>(collect: F) -> Arc<Self>
        where
            F: Fn() -> Result<Vec<SourceRecord<String>>, SourceError> + Send + Sync + 'static,
        {
            Arc::new(Self(Box::new(collect)))
        }

        pub(super) fn records(records: &[(&str, &[(&str, u32)])]) -> Arc<Self> {
            let records: Vec<SourceRecord<String>> = records
                .iter()
                .map(|(id, keywords)| {
                    SourceRecord::new(
                        *id,
                        keywords
                            .iter()
                            .map(|(text, weight)| WeightedKeyword::new(*text, *weight))
                            .collect(),
                        id.to_string(),
                    )
                })
                .collect();
            Self::new(move || Ok(records.clone()))
        }
    }

    impl ItemSource<String> for FnSource {
        fn name(&self) -> &str {
            "test"
        }

        fn collect(&self) -> Result<Vec<SourceRecord<String>>, SourceError> {
            (self.0)()
        }
    }

    pub(super) struct StatusChannel {
        pub(super) notify: StatusNotify,
        pub(super) statuses: Mutex<Receiver<IndexerStatus>>,
    }

    impl StatusChannel {
        pub(super) fn new() -> Self {
            let (tx, rx) = mpsc::channel();
            Self {
                notify: Arc::new(move |status: &IndexerStatus| {
                    let _ = tx.send(status.clone());
                }),
                statuses: Mutex::new(rx),
            }
        }
    }

    /// Blocks until the indexer reports a finished or failed rebuild.
    pub(super) fn wait_for_completion(channel: &StatusChannel) -> IndexerStatus {
        let statuses = channel.statuses.lock();
        loop {
            let status = statuses
                .recv_timeout(Duration::from_secs(10))
                .expect("indexer did not report completion");
            if !matches!(status, IndexerStatus::Indexing | IndexerStatus::Pending) {
                return status;
            }
        }
    }
}

mod add {
    use super::*;

    #[test]
    fn test_add_registers_every_keyword_token() {
        let index = build_index(&[("1", &[("Example Site", 100), ("docs.example.org", 10)])]);

        assert_eq!(index.len(), 1);
        // example, site, docs, org
        assert_eq!(index.token_count(), 4);
    }

    #[test]
    fn test_add_keeps_max_weight_for_coinciding_tokens() {
        let index = build_index(&[("1", &[("rust", 10), ("Rust book", 40)])]);

        let results = index.search("rust");

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, 40 * u64::from(MAX_SCORE));
    }

    #[test]
    fn test_add_duplicate_keywords_across_items_are_independent() {
        let index = build_index(&[("1", &[("notes", 10)]), ("2", &[("notes", 30)])]);

        let results = index.search("notes");

        assert_eq!(ids(&results), vec!["2", "1"]);
        assert_eq!(results[0].score, 30 * u64::from(MAX_SCORE));
        assert_eq!(results[1].score, 10 * u64::from(MAX_SCORE));
    }

    #[test]
    fn test_add_item_without_tokens_is_stored_but_unmatchable() {
        let index = build_index(&[("1", &[("---", 10)])]);

        assert_eq!(index.len(), 1);
        assert_eq!(index.token_count(), 0);
        assert!(index.search("-").is_empty());
    }
}

mod clear {
    use super::*;

    #[test]
    fn test_clear_empties_index() {
        let mut index = build_index(&[("1", &[("alpha", 1)]), ("2", &[("beta", 1)])]);

        index.clear();

        assert!(index.is_empty());
        assert_eq!(index.token_count(), 0);
        assert!(index.search("alpha").is_empty());
    }

    #[test]
    fn test_clear_then_add_restarts_ordinals() {
        let mut index = build_index(&[("old", &[("alpha", 1)])]);
        index.clear();
        index.add(item("new", &[("alpha", 1)]));

        assert_eq!(ids(&index.search("alpha")), vec!["new"]);
    }
}

mod search {
    use super::*;

    fn scenario() -> OfflineIndex<String> {
        build_index(&[
            ("1", &[("Example Site", 100)]),
            ("2", &[("example", 50), ("other", 10)]),
        ])
    }

    #[test]
    fn test_search_prefix_ranks_by_weight() {
        let results = scenario().search("exa");

        assert_eq!(ids(&results), vec!["1", "2"]);
        assert!(results[0].score > results[1].score);
    }

    #[test]
    fn test_search_unmatched_token_excludes_everything() {
        assert!(scenario().search("exa zzz").is_empty());
    }

    #[test]
    fn test_search_empty_query_returns_nothing() {
        let index = scenario();

        assert!(index.search("").is_empty());
        assert!(index.search("   ").is_empty());
        assert!(index.search(" - / ").is_empty());
    }

    #[test]
    fn test_search_empty_index_returns_nothing() {
        let index: OfflineIndex<String> = OfflineIndex::default();
        assert!(index.search("anything").is_empty());
    }

    #[test]
    fn test_search_exact_keyword_scores_at_least_weight_times_max() {
        let index = scenario();

        let results = index.search("Example Site");

        assert_eq!(ids(&results), vec!["1"]);
        assert!(results[0].score >= 100 * u64::from(MAX_SCORE));

        let results = index.search("other");
        assert_eq!(ids(&results), vec!["2"]);
        assert_eq!(results[0].score, 10 * u64::from(MAX_SCORE));
    }

    #[test]
    fn test_search_is_conjunctive_across_query_tokens() {
        let index = build_index(&[
            ("both", &[("alpha beta", 10)]),
            ("alpha-only", &[("alpha", 10)]),
            ("split", &[("alpha", 10), ("beta", 1)]),
        ]);

        let results = index.search("al be");

        assert_eq!(ids(&results), vec!["both", "split"]);
    }

    #[test]
    fn test_search_single_character_token_prefix_matches() {
        let index = build_index(&[("1", &[("xylophone", 1)]), ("2", &[("piano", 1)])]);

        assert_eq!(ids(&index.search("x")), vec!["1"]);
    }

    #[test]
    fn test_search_is_case_and_whitespace_insensitive() {
        let index = scenario();

        assert_eq!(ids(&index.search("  EXAMPLE   site ")), vec!["1"]);
    }

    #[test]
    fn test_search_repeated_query_token_counts_once() {
        let index = scenario();

        let once = index.search("other");
        let twice = index.search("other other");

        assert_eq!(once[0].score, twice[0].score);
    }

    #[test]
    fn test_search_ties_break_by_insertion_order() {
        let index = build_index(&[
            ("c", &[("report", 5)]),
            ("a", &[("report", 5)]),
            ("b", &[("report", 5)]),
        ]);

        assert_eq!(ids(&index.search("rep")), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_search_is_deterministic() {
        let index = build_index(&[
            ("1", &[("project plan", 7)]),
            ("2", &[("project", 7)]),
            ("3", &[("plan project", 7)]),
            ("4", &[("projection", 9)]),
        ]);

        let first = ids(&index.search("proj"));
        for _ in 0..20 {
            assert_eq!(ids(&index.search("proj")), first);
        }
    }

    #[test]
    fn test_search_limited_truncates() {
        let index = build_index(&[
            ("1", &[("note one", 1)]),
            ("2", &[("note two", 1)]),
            ("3", &[("note three", 1)]),
        ]);

        assert_eq!(ids(&index.search_limited("note", 2)), vec!["1", "2"]);
    }

    #[test]
    fn test_search_results_outlive_the_index() {
        let results = {
            let index = scenario();
            index.search("other")
        };

        assert_eq!(results[0].item.payload(), "payload of 2");
    }
}

mod fuzzy {
    use super::*;

    #[test]
    fn test_fuzzy_disabled_rejects_substitution() {
        let index = build_index(&[("1", &[("example", 10)])]);

        assert!(!index.fuzzy());
        assert!(index.search("exbmple").is_empty());
    }

    #[test]
    fn test_fuzzy_enabled_accepts_substitution_below_exact_score() {
        let mut index = build_index(&[("1", &[("example", 10)])]);
        index.set_fuzzy(true);

        let fuzzy = index.search("exbmple");
        let exact = index.search("example");

        assert_eq!(ids(&fuzzy), vec!["1"]);
        assert!(fuzzy[0].score < exact[0].score);
    }

    #[test]
    fn test_fuzzy_rejects_beyond_threshold() {
        let mut index = build_index(&[("1", &[("example", 10)])]);
        index.set_fuzzy(true);

        assert!(index.search("axbmple").is_empty());
    }

    #[test]
    fn test_fuzzy_falls_back_only_without_prefix_candidates() {
        let index = build_index(&[("typo", &[("exbmple", 10)]), ("real", &[("example", 10)])])
            .with_fuzzy(true);

        // "exbmple" has prefix candidates, so no edit-distance pass runs.
        assert_eq!(ids(&index.search("exbmple")), vec!["typo"]);
        // "excmple" has none and reaches both within one edit.
        assert_eq!(ids(&index.search("excmple")), vec!["typo", "real"]);
    }

    #[test]
    fn test_fuzzy_mode_can_be_chosen_per_search() {
        let index = build_index(&[("1", &[("example", 10)])]);

        assert!(index.search_in_mode("exbmple", false).is_empty());
        assert_eq!(ids(&index.search_in_mode("exbmple", true)), vec!["1"]);
    }

    #[test]
    fn test_fuzzy_toggle_needs_no_rebuild() {
        let mut index = build_index(&[("1", &[("bookmark", 10)])]);

        assert!(index.search("bokmark").is_empty());
        index.set_fuzzy(true);
        assert_eq!(ids(&index.search("bokmark")), vec!["1"]);
        index.set_fuzzy(false);
        assert!(index.search("bokmark").is_empty());
    }
}

mod shared {
    use super::*;

    #[test]
    fn test_publish_replaces_visible_generation() {
        let shared = SharedIndex::new(build_index(&[("old", &[("alpha", 1)])]));

        let previous = shared.publish(build_index(&[("new", &[("alpha", 1)])]));

        assert_eq!(ids(&previous.search("alpha")), vec!["old"]);
        assert_eq!(ids(&shared.search("alpha")), vec!["new"]);
    }

    #[test]
    fn test_snapshot_survives_publish() {
        let shared = SharedIndex::new(build_index(&[("old", &[("alpha", 1)])]));
        let in_flight = shared.snapshot();

        shared.publish(OfflineIndex::default());

        assert_eq!(ids(&in_flight.search("alpha")), vec!["old"]);
        assert!(shared.search("alpha").is_empty());
    }

    #[test]
    fn test_set_fuzzy_applies_to_published_generation() {
        let shared = SharedIndex::new(build_index(&[("1", &[("example", 1)])]));

        assert!(shared.search("exbmple").is_empty());
        shared.set_fuzzy(true);
        assert_eq!(ids(&shared.search("exbmple")), vec!["1"]);
    }

    #[test]
    fn test_shared_index_starts_with_initial_mode() {
        let shared = SharedIndex::new(OfflineIndex::<String>::default().with_fuzzy(true));
        assert!(shared.fuzzy());
        assert!(shared.is_empty());
    }
}

mod indexer {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_indexer_publishes_new_generation() {
        let channel = StatusChannel::new();
        let shared = Arc::new(SharedIndex::default());
        let source = FnSource::records(&[
            ("1", &[("Example Site", 100)]),
            ("2", &[("example", 50)]),
        ]);
        let indexer = BackgroundIndexer::new("test", Arc::clone(&shared), source, channel.notify.clone());

        assert_eq!(indexer.last_status(), IndexerStatus::Pending);
        assert!(indexer.start_indexing());

        assert_eq!(
            wait_for_completion(&channel),
            IndexerStatus::Indexed { items: 2, skipped: 0 }
        );
        assert_eq!(indexer.state(), IndexerState::Idle);
        assert_eq!(ids(&shared.search("exa")), vec!["1", "2"]);
    }

    #[test]
    fn test_indexer_skips_malformed_items() {
        let channel = StatusChannel::new();
        let shared = Arc::new(SharedIndex::default());
        let source = FnSource::records(&[
            ("good", &[("alpha", 1)]),
            ("no-keywords", &[]),
            (" ", &[("alpha", 1)]),
        ]);
        let indexer = BackgroundIndexer::new("test", Arc::clone(&shared), source, channel.notify.clone());

        indexer.start_indexing();

        assert_eq!(
            wait_for_completion(&channel),
            IndexerStatus::Indexed { items: 1, skipped: 2 }
        );
        assert_eq!(ids(&shared.search("alpha")), vec!["good"]);
    }

    #[test]
    fn test_indexer_skips_repeated_ids() {
        let channel = StatusChannel::new();
        let shared = Arc::new(SharedIndex::default());
        let source = FnSource::records(&[
            ("dup", &[("alpha", 1)]),
            ("other", &[("alpha", 1)]),
            ("dup", &[("alpha beta", 1)]),
        ]);
        let indexer = BackgroundIndexer::new("test", Arc::clone(&shared), source, channel.notify.clone());

        indexer.start_indexing();

        assert_eq!(
            wait_for_completion(&channel),
            IndexerStatus::Indexed { items: 2, skipped: 1 }
        );
        assert_eq!(ids(&shared.search("alpha")), vec!["dup", "other"]);
        assert!(shared.search("beta").is_empty());
    }

    #[test]
    fn test_indexer_survives_panicking_source() {
        let channel = StatusChannel::new();
        let shared = Arc::new(SharedIndex::default());
        let calls = AtomicUsize::new(0);
        let source = FnSource::new(move || {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("places database vanished");
            }
            Ok(vec![SourceRecord::new(
                "1",
                vec![WeightedKeyword::new("alpha", 1)],
                String::new(),
            )])
        });
        let indexer = BackgroundIndexer::new("test", Arc::clone(&shared), source, channel.notify.clone());

        assert!(indexer.start_indexing());
        let status = wait_for_completion(&channel);
        assert_eq!(
            status,
            IndexerStatus::Failed {
                message: "source panicked".to_string()
            }
        );
        assert_eq!(indexer.last_status(), status);
        assert_eq!(indexer.state(), IndexerState::Idle);

        assert!(indexer.start_indexing());
        assert_eq!(
            wait_for_completion(&channel),
            IndexerStatus::Indexed { items: 1, skipped: 0 }
        );
        assert_eq!(ids(&shared.search("alpha")), vec!["1"]);
    }

    #[test]
    fn test_indexer_status_follows_accepted_requests() {
        let channel = StatusChannel::new();
        let shared = Arc::new(SharedIndex::default());
        let indexer = Arc::new(BackgroundIndexer::new(
            "test",
            Arc::clone(&shared),
            FnSource::records(&[("1", &[("alpha", 1)])]),
            channel.notify.clone(),
        ));

        let requester = {
            let indexer = Arc::clone(&indexer);
            thread::spawn(move || {
                let mut accepted = 0;
                while accepted < 50 {
                    if indexer.start_indexing() {
                        accepted += 1;
                    }
                }
            })
        };
        requester.join().unwrap();

        let statuses = channel.statuses.lock();
        for _ in 0..50 {
            let started = statuses.recv_timeout(Duration::from_secs(10)).unwrap();
            let finished = statuses.recv_timeout(Duration::from_secs(10)).unwrap();
            assert_eq!(started, IndexerStatus::Indexing);
            assert_eq!(finished, IndexerStatus::Indexed { items: 1, skipped: 0 });
        }
        assert_eq!(
            indexer.last_status(),
            IndexerStatus::Indexed { items: 1, skipped: 0 }
        );
        assert_eq!(indexer.state(), IndexerState::Idle);
    }

    #[test]
    fn test_indexer_failure_keeps_last_good_generation() {
        let channel = StatusChannel::new();
        let shared = Arc::new(SharedIndex::default());
        let indexer = BackgroundIndexer::new(
            "test",
            Arc::clone(&shared),
            FnSource::records(&[("1", &[("alpha", 1)])]),
            channel.notify.clone(),
        );
        indexer.start_indexing();
        wait_for_completion(&channel);

        indexer.set_source(FnSource::new(|| {
            Err(SourceError::Unavailable("database locked".to_string()))
        }));
        indexer.start_indexing();

        let status = wait_for_completion(&channel);
        assert_eq!(
            status,
            IndexerStatus::Failed {
                message: "source unavailable: database locked".to_string()
            }
        );
        assert_eq!(indexer.last_status(), status);
        assert_eq!(indexer.state(), IndexerState::Idle);
        assert_eq!(ids(&shared.search("alpha")), vec!["1"]);
    }

    #[test]
    fn test_indexer_drops_request_while_running() {
        let channel = StatusChannel::new();
        let shared = Arc::new(SharedIndex::default());
        let (gate_tx, gate_rx) = mpsc::channel::<()>();
        let gate = Mutex::new(gate_rx);
        let source = FnSource::new(move || {
            let _ = gate.lock().recv();
            Ok(vec![SourceRecord::new(
                "1",
                vec![WeightedKeyword::new("alpha", 1)],
                String::new(),
            )])
        });
        let indexer = BackgroundIndexer::new("test", Arc::clone(&shared), source, channel.notify.clone());

        assert!(indexer.start_indexing());
        assert_eq!(indexer.state(), IndexerState::Running);
        assert!(!indexer.start_indexing());
        assert_eq!(indexer.last_status(), IndexerStatus::Indexing);

        gate_tx.send(()).unwrap();
        assert_eq!(
            wait_for_completion(&channel),
            IndexerStatus::Indexed { items: 1, skipped: 0 }
        );
        assert_eq!(indexer.state(), IndexerState::Idle);

        // The dropped request was not queued behind the first one.
        assert!(channel.statuses.lock().try_recv().is_err());
    }

    #[test]
    fn test_indexer_keeps_fuzzy_mode_across_rebuilds() {
        let channel = StatusChannel::new();
        let shared = Arc::new(SharedIndex::default());
        shared.set_fuzzy(true);
        let indexer = BackgroundIndexer::new(
            "test",
            Arc::clone(&shared),
            FnSource::records(&[("1", &[("example", 1)])]),
            channel.notify.clone(),
        );

        indexer.start_indexing();
        wait_for_completion(&channel);

        assert_eq!(ids(&shared.search("exbmple")), vec!["1"]);
    }

    #[test]
    fn test_indexer_keeps_tokenizer_of_published_generation() {
        let channel = StatusChannel::new();
        let tokenizer = Tokenizer::new(TokenizerConfig {
            separators: vec!['+'],
            unicode_normalization: true,
        });
        let shared = Arc::new(SharedIndex::new(OfflineIndex::new(tokenizer)));
        let indexer = BackgroundIndexer::new(
            "test",
            Arc::clone(&shared),
            FnSource::records(&[("1", &[("c+rust", 1)])]),
            channel.notify.clone(),
        );

        indexer.start_indexing();
        wait_for_completion(&channel);

        assert_eq!(ids(&shared.search("rust")), vec!["1"]);
    }

    #[test]
    fn test_status_describes_progress() {
        assert_eq!(IndexerStatus::Indexing.describe("bookmarks"), "Indexing bookmarks ...");
        assert_eq!(
            IndexerStatus::Indexed { items: 3, skipped: 0 }.describe("bookmarks"),
            "3 bookmarks indexed."
        );
        assert_eq!(
            IndexerStatus::Failed { message: "boom".into() }.to_string(),
            "Indexing items failed: boom"
        );
    }
}
