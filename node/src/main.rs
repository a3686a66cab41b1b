// Copyright (c) 2026 VERA Contributors. MIT License.
// See LICENSE for details.

//! # VERA Node
//!
//! Entry point for the `vera-node` binary. Parses CLI arguments,
//! initializes logging and metrics, restores (or creates) the ledger,
//! and serves the ballot-intake HTTP API.
//!
//! The binary supports four subcommands:
//!
//! - `run`     — start the ballot-intake service
//! - `init`    — initialize the data directory and seal genesis
//! - `export`  — dump the persisted chain as CSV, offline
//! - `version` — print build version information

mod api;
mod cli;
mod logging;
mod metrics;
mod registry;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use parking_lot::Mutex;
use tokio::signal;

use vera_ledger::{JsonDirSink, Ledger, NullSink, SystemClock};

use cli::{Commands, VeraNodeCli};
use logging::LogFormat;
use metrics::NodeMetrics;
use registry::VoterRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = VeraNodeCli::parse();

    match cli.command {
        Commands::Run(args) => run_node(args).await,
        Commands::Init(args) => init_node(args),
        Commands::Export(args) => export_chain(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Starts the full service: ledger restore, API server, metrics endpoint.
async fn run_node(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(
        "vera_node=info,vera_ledger=info,tower_http=info",
        LogFormat::from_str_lossy(&args.log_format),
    );

    tracing::info!(
        rpc_port = args.rpc_port,
        metrics_port = args.metrics_port,
        batch_size = args.batch_size,
        volatile = args.volatile,
        data_dir = %args.data_dir.display(),
        "starting vera-node"
    );

    // --- Ledger: restore from disk, or seal a fresh genesis ---
    let ledger = if args.volatile {
        tracing::warn!("running volatile: a restart loses the whole chain");
        Ledger::new(args.batch_size)?
    } else {
        let blocks_dir = args.data_dir.join("blocks");
        std::fs::create_dir_all(&blocks_dir).with_context(|| {
            format!("failed to create blocks directory: {}", blocks_dir.display())
        })?;

        let blocks = JsonDirSink::load_blocks(&blocks_dir)
            .with_context(|| format!("failed to load blocks from {}", blocks_dir.display()))?;
        let sink = Box::new(JsonDirSink::new(blocks_dir.clone())?);

        if blocks.is_empty() {
            Ledger::with_parts(args.batch_size, Box::new(SystemClock), sink)?
        } else {
            Ledger::restore(blocks, args.batch_size, Box::new(SystemClock), sink)
                .context("persisted chain failed integrity checks; refusing to start")?
        }
    };
    tracing::info!(height = ledger.len(), "ledger ready");

    // --- Voter registry, primed from the restored chain ---
    let registry = Arc::new(VoterRegistry::from_blocks(ledger.all_blocks()));
    tracing::info!(voters = registry.len(), "voter registry primed");

    // --- Metrics ---
    let node_metrics = Arc::new(NodeMetrics::new());
    node_metrics.chain_height.set(ledger.len() as i64);
    node_metrics.pending_entries.set(ledger.pending_len() as i64);

    // --- Application state ---
    let state = api::AppState {
        version: env!("CARGO_PKG_VERSION").to_string(),
        ledger: Arc::new(Mutex::new(ledger)),
        registry,
        metrics: Arc::clone(&node_metrics),
    };

    // --- API server ---
    let api_router = api::create_router(state);
    let api_addr = format!("0.0.0.0:{}", args.rpc_port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {api_addr}"))?;
    tracing::info!("API server listening on {api_addr}");

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&node_metrics));
    let metrics_addr = format!("0.0.0.0:{}", args.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {metrics_addr}"))?;
    tracing::info!("metrics server listening on {metrics_addr}");

    // --- Serve ---
    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {e}");
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("metrics server error: {e}");
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received, draining connections");
        }
    }

    tracing::info!("vera-node stopped");
    Ok(())
}

/// Initializes the data directory: seals and persists the genesis block.
///
/// Running `init` on an already-initialized directory is a no-op that
/// reports the existing chain height.
fn init_node(args: cli::InitArgs) -> Result<()> {
    logging::init_logging("vera_node=info", LogFormat::Pretty);

    let blocks_dir = args.data_dir.join("blocks");
    std::fs::create_dir_all(&blocks_dir)
        .with_context(|| format!("failed to create blocks directory: {}", blocks_dir.display()))?;

    let existing = JsonDirSink::load_blocks(&blocks_dir)?;
    if !existing.is_empty() {
        println!(
            "Data directory already initialized: {} block(s) at {}",
            existing.len(),
            blocks_dir.display()
        );
        return Ok(());
    }

    let sink = Box::new(JsonDirSink::new(blocks_dir.clone())?);
    let ledger = Ledger::with_parts(
        vera_ledger::config::DEFAULT_BATCH_SIZE,
        Box::new(SystemClock),
        sink,
    )?;

    println!("Ledger initialized.");
    println!("  Data directory : {}", args.data_dir.display());
    println!("  Genesis hash   : {}", ledger.latest_block().hash);
    Ok(())
}

/// Validates the persisted chain, then writes its CSV export to stdout
/// or the requested file.
fn export_chain(args: cli::ExportArgs) -> Result<()> {
    // Quiet by default: stdout carries the CSV, stderr only real trouble.
    logging::init_logging("vera_node=warn,vera_ledger=warn", LogFormat::Pretty);

    let blocks_dir = args.data_dir.join("blocks");
    let blocks = JsonDirSink::load_blocks(&blocks_dir)
        .with_context(|| format!("failed to load blocks from {}", blocks_dir.display()))?;
    if blocks.is_empty() {
        bail!(
            "no blocks found in {} — run `vera-node init` first",
            blocks_dir.display()
        );
    }

    // Restore performs the full integrity walk; a tampered archive is
    // refused rather than exported as if nothing happened.
    let ledger = Ledger::restore(
        blocks,
        vera_ledger::config::DEFAULT_BATCH_SIZE,
        Box::new(SystemClock),
        Box::new(NullSink),
    )
    .context("persisted chain failed integrity checks; refusing to export")?;

    let columns = vera_ledger::export::collect_columns(ledger.all_blocks());
    match args.output {
        Some(path) => {
            let file = std::fs::File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            vera_ledger::export::write_csv(ledger.all_blocks(), &columns, file)?;
            eprintln!("Exported {} block(s) to {}", ledger.len(), path.display());
        }
        None => {
            let stdout = std::io::stdout().lock();
            vera_ledger::export::write_csv(ledger.all_blocks(), &columns, stdout)?;
        }
    }
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("vera-node   {}", env!("CARGO_PKG_VERSION"));
    println!("vera-ledger {}", env!("CARGO_PKG_VERSION"));
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
