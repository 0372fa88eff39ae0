use anyhow::{Context, Result, bail};
use clap::Parser;
use lantern_core::types::AppConfig;
use lantern_extensions::external::{ExternalExtension, ExternalSource};
use lantern_extensions::files::FilesExtension;
use lantern_extensions::{
    Desktop, IndexedExtension, Proposal, Query, QueryHandler, SystemDesktop, run_query,
};
use lantern_search::{IndexerStatus, StatusNotify};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lantern")]
#[command(about = "Search local files and external extensions from the terminal", long_about = None)]
struct Cli {
    /// Config file [default: <data dir>/lantern/config.toml]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Accept misspelled query words
    #[arg(long)]
    fuzzy: bool,

    /// Maximum number of results [default: search.result_limit]
    #[arg(short, long)]
    limit: Option<usize>,

    /// Run the default action of the N-th result
    #[arg(short, long, value_name = "N")]
    activate: Option<usize>,

    /// Search term
    #[arg(required = true)]
    query: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref());
    if cli.fuzzy {
        config.files.fuzzy = true;
        config.external.fuzzy = true;
    }

    let desktop: Arc<dyn Desktop> = Arc::new(SystemDesktop);
    let (notify, statuses) = status_channel();
    let mut handlers: Vec<Arc<dyn QueryHandler>> = Vec::new();
    let mut indexing = 0;

    let files = FilesExtension::new(
        &config.files,
        &config.search,
        Arc::clone(&desktop),
        notify.clone(),
    );
    if files.start_indexing() {
        indexing += 1;
    }
    handlers.push(Arc::new(files));

    for extension in &config.external.extensions {
        let loaded = match ExternalExtension::load(
            extension.id.clone(),
            extension.path.clone(),
            Arc::clone(&desktop),
        ) {
            Ok(loaded) => loaded,
            Err(err) => {
                warn!("[{}] Not loaded: {}", extension.id, err);
                continue;
            }
        };

        if extension.offline_index {
            let indexed = IndexedExtension::new(
                extension.id.clone(),
                "items",
                &config.search,
                config.external.fuzzy,
                Arc::new(ExternalSource::new(Arc::new(loaded))),
                notify.clone(),
            );
            if indexed.start_indexing() {
                indexing += 1;
            }
            handlers.push(Arc::new(indexed));
        } else {
            handlers.push(Arc::new(loaded));
        }
    }

    wait_for_indexers(&statuses, indexing);

    let query = Query::new(cli.query.join(" "));
    let limit = cli.limit.unwrap_or(config.search.result_limit);

    for handler in &handlers {
        handler.setup_session();
    }
    let proposals = run_query(&handlers, &query, limit);
    for handler in &handlers {
        handler.teardown_session();
    }

    print_proposals(&proposals);

    if let Some(n) = cli.activate {
        activate(&proposals, n)?;
    }
    Ok(())
}

fn load_config(explicit: Option<&PathBuf>) -> AppConfig {
    let path = match explicit {
        Some(path) => path.clone(),
        None => match dirs::data_dir() {
            Some(dir) => AppConfig::path(&dir.join("lantern")),
            None => return AppConfig::default(),
        },
    };
    info!("Using config {}", path.display());
    AppConfig::load_or_default(&path)
}

fn status_channel() -> (StatusNotify, Receiver<IndexerStatus>) {
    let (tx, rx) = mpsc::channel();
    let notify: StatusNotify = Arc::new(move |status: &IndexerStatus| {
        let _ = tx.send(status.clone());
    });
    (notify, rx)
}

/// Blocks until `count` rebuilds have finished or failed.
fn wait_for_indexers(statuses: &Receiver<IndexerStatus>, count: usize) {
    let mut finished = 0;
    while finished < count {
        let Ok(status) = statuses.recv() else {
            return;
        };
        match status {
            IndexerStatus::Indexed { .. } => {
                info!("{}", status);
                finished += 1;
            }
            IndexerStatus::Failed { .. } => {
                warn!("{}", status);
                finished += 1;
            }
            IndexerStatus::Pending | IndexerStatus::Indexing => {}
        }
    }
}

fn print_proposals(proposals: &[Proposal]) {
    for (n, proposal) in proposals.iter().enumerate() {
        let entry = proposal.entry();
        println!(
            "{:>3}. {:>12}  {}  {}",
            n + 1,
            proposal.score,
            entry.text,
            entry.subtext
        );
    }
}

fn activate(proposals: &[Proposal], n: usize) -> Result<()> {
    let Some(proposal) = n.checked_sub(1).and_then(|i| proposals.get(i)) else {
        bail!("there is no result #{n}");
    };
    let Some(action) = proposal.entry().default_action() else {
        bail!("\"{}\" has no action", proposal.entry().text);
    };

    action
        .activate()
        .with_context(|| format!("running \"{}\"", action.label()))?;
    println!("{}: {}", action.label(), proposal.entry().text);
    Ok(())
}
