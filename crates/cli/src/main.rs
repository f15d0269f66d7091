// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `crawl`: the CLI front-end over the resumable crawl engine.
//!
//! Six subcommands: `start`, `stop`, `clean`, `configcheck`,
//! `storeexport`, `storeimport`. Each takes `-c/--config <file>` (required)
//! and an optional `--variables <file>` overlay. This binary bundles its own
//! minimal filesystem collector (see [`collector`]); a production deployment
//! would swap in a real `Fetcher`/`LinkExtractor`/`CommitterPipeline` without
//! touching `crawl-engine`.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod collector;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use collector::{FilesystemChecksummer, FilesystemCommitter, FilesystemFetcher, NullLinkExtractor};
use crawl_adapters::{DefaultImporter, NoOpCrawlerHooks};
use crawl_core::{CrawlConfig, EventBus, Reference, SystemClock};
use crawl_engine::LifecycleController;
use crawl_storage::{import_store, CrawlStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const STOP_REQUEST_FILE: &str = "stop.request";
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Parser)]
#[command(
    name = "crawl",
    version,
    about = "Resumable, multi-threaded reference crawler"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run (or resume) a crawl to completion.
    Start(ConfigArgs),
    /// Request a cooperative stop of a crawl currently running for this crawler.
    Stop(ConfigArgs),
    /// Delete every reference the store still knows about.
    Clean(ConfigArgs),
    /// Validate a configuration file without running anything.
    Configcheck(ConfigArgs),
    /// Export the persisted store to a portable snapshot file.
    Storeexport(StorePathArgs),
    /// Replace the persisted store with a previously exported snapshot.
    Storeimport(StorePathArgs),
}

#[derive(Debug, clap::Args)]
struct ConfigArgs {
    /// Crawler configuration file (TOML).
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: PathBuf,
    /// Optional TOML overlay merged on top before the primary file parses.
    #[arg(long = "variables", value_name = "FILE")]
    variables: Option<PathBuf>,
}

#[derive(Debug, clap::Args)]
struct StorePathArgs {
    #[command(flatten)]
    config: ConfigArgs,
    /// Snapshot file path.
    #[arg(value_name = "PATH")]
    path: PathBuf,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code_for(&e));
    }
}

/// Maps a failed run's error chain to an exit code: configuration errors get
/// their own code so wrapper scripts can distinguish "fix your config" from
/// "retry, the store may be fine".
fn exit_code_for(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if cause.downcast_ref::<crawl_core::ConfigError>().is_some() {
            return 2;
        }
        if let Some(crawl_engine::EngineError::FatalException { .. }) =
            cause.downcast_ref::<crawl_engine::EngineError>()
        {
            return 3;
        }
    }
    1
}

async fn run() -> Result<()> {
    match Cli::parse().command {
        Command::Start(args) => run_start(args).await,
        Command::Stop(args) => run_stop(args),
        Command::Clean(args) => run_clean(args).await,
        Command::Configcheck(args) => run_configcheck(args),
        Command::Storeexport(args) => run_storeexport(args),
        Command::Storeimport(args) => run_storeimport(args),
    }
}

fn load_config(args: &ConfigArgs) -> Result<CrawlConfig> {
    CrawlConfig::load(&args.config, args.variables.as_deref()).with_context(|| {
        format!(
            "failed to load configuration from {}",
            args.config.display()
        )
    })
}

fn stop_request_path(config: &CrawlConfig) -> PathBuf {
    config.store_dir().join(STOP_REQUEST_FILE)
}

/// Builds the bundled filesystem collector's importer/committer/checksummer
/// trio for `config`.
#[allow(clippy::type_complexity)]
fn build_collector(
    config: &CrawlConfig,
) -> (
    Arc<DefaultImporter<FilesystemFetcher, NullLinkExtractor>>,
    Arc<FilesystemCommitter>,
    Arc<FilesystemChecksummer>,
) {
    let fetcher = FilesystemFetcher::new(config.source_dir.clone());
    let importer = Arc::new(DefaultImporter::new(fetcher, NullLinkExtractor));
    let committer = Arc::new(FilesystemCommitter::new(config.downloads_dir()));
    let checksummer = Arc::new(FilesystemChecksummer);
    (importer, committer, checksummer)
}

async fn run_start(args: ConfigArgs) -> Result<()> {
    let config = load_config(&args)?;
    std::fs::create_dir_all(config.store_dir()).context("creating store directory")?;
    let stop_request = stop_request_path(&config);
    // A stale request left behind by a prior invocation must not stop this one.
    let _ = std::fs::remove_file(&stop_request);

    let bus = Arc::new(EventBus::new());
    let (importer, committer, checksummer) = build_collector(&config);
    let seeds: Vec<Reference> = config.seeds.iter().cloned().map(Reference::seed).collect();

    // Every invocation re-seeds the full configured set (below), so there is
    // never a queue left over from a prior process for resume to continue —
    // `false` makes each run a fresh pass that still reuses the last
    // completed run's cache for checksum comparison and orphan detection.
    let (controller, resuming) = LifecycleController::init(
        config,
        bus,
        SystemClock,
        importer,
        committer,
        checksummer,
        Arc::new(NoOpCrawlerHooks),
        false,
    )
    .context("initializing crawler")?;
    tracing::info!(resuming, "crawler initialized");
    controller
        .seed(seeds)
        .context("queuing seed references")?;

    let controller = Arc::new(controller);

    let watcher = tokio::spawn({
        let controller = controller.clone();
        let stop_request = stop_request.clone();
        async move {
            loop {
                tokio::time::sleep(STOP_POLL_INTERVAL).await;
                if stop_request.exists() {
                    let _ = std::fs::remove_file(&stop_request);
                    controller.stop();
                    break;
                }
            }
        }
    });

    let ctrl_c = tokio::spawn({
        let controller = controller.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                controller.stop();
            }
        }
    });

    let run_result = controller.run().await;
    watcher.abort();
    ctrl_c.abort();

    controller.close().context("closing store")?;
    run_result.context("crawl run failed")?;
    Ok(())
}

/// `stop` has no running process to signal directly, so it drops a marker
/// file in the crawler's store directory; the `start` invocation for the
/// same crawler polls for it (see [`run_start`]'s watcher task).
fn run_stop(args: ConfigArgs) -> Result<()> {
    let config = load_config(&args)?;
    std::fs::create_dir_all(config.store_dir()).context("creating store directory")?;
    std::fs::write(stop_request_path(&config), b"").context("writing stop request marker")?;
    println!("stop requested for crawler '{}'", config.crawler_id);
    Ok(())
}

async fn run_clean(args: ConfigArgs) -> Result<()> {
    let config = load_config(&args)?;
    let bus = Arc::new(EventBus::new());
    let (importer, committer, checksummer) = build_collector(&config);

    // `clean` only walks `cached` (see `LifecycleController::clean`), and the
    // fresh-start path is the one that drains `processedValid` into `cached`
    // — `false` here is what makes every previously committed reference
    // reachable for the delete sweep.
    let (controller, _) = LifecycleController::init(
        config,
        bus,
        SystemClock,
        importer,
        committer,
        checksummer,
        Arc::new(NoOpCrawlerHooks),
        false,
    )
    .context("initializing crawler")?;

    let clean_result = controller.clean().await;
    controller.close().context("closing store")?;
    clean_result.context("clean failed")?;
    Ok(())
}

fn run_configcheck(args: ConfigArgs) -> Result<()> {
    let config = load_config(&args)?;
    println!(
        "configuration OK: crawler_id={}, workers={}, max_documents={}",
        config.crawler_id, config.workers, config.max_documents
    );
    Ok(())
}

fn run_storeexport(args: StorePathArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let (store, _) = CrawlStore::open(&config.store_dir(), true).context("opening store")?;
    store.export_to(&args.path).context("exporting store")?;
    store.close().context("closing store")?;
    println!("exported store to {}", args.path.display());
    Ok(())
}

fn run_storeimport(args: StorePathArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    import_store(&config.store_dir(), &args.path).context("importing store")?;
    println!("imported store from {}", args.path.display());
    Ok(())
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
