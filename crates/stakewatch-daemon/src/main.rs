// crates/stakewatch-daemon/src/main.rs
//
// Binary entrypoint for the StakeWatch relay watcher.
//
// Parses CLI arguments, loads configuration, initializes tracing, wires
// the source/destination clients and checkpoint store into a block
// poller, and runs it until Ctrl-C or a fatal error.

mod config;
mod mock;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::watch;

use config::WatcherConfig;
use stakewatch_core::{CheckpointStore, DestinationChain, SourceChain};
use stakewatch_rpc::{EthRpcClient, MockDestination, RelayRpcClient};
use stakewatch_store::paths::expand_tilde;
use stakewatch_store::{FileCheckpointStore, InMemoryCheckpointStore};
use stakewatch_sync::{resume_height, BlockPoller, EpochSynchronizer, EventScanner, SnapshotBuilder};

/// StakeWatch daemon: relays ranked stake info from the source chain to
/// the destination chain.
#[derive(Parser, Debug)]
#[command(name = "stakewatch", version = "0.1.0", about = "StakeWatch relay watcher")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "~/.stakewatch/config.toml")]
    config: String,

    /// Log filter (e.g. "debug", "stakewatch_sync=trace"). Overrides the
    /// config file's log_level; RUST_LOG overrides both.
    #[arg(long, short)]
    verbosity: Option<String>,

    /// Snapshot file to use instead of the configured one.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Run against seeded in-memory chains and store.
    #[arg(long)]
    mock: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration from TOML file, falling back to defaults if the file
    // is not found. Reported once tracing is up.
    let config_path = expand_tilde(&args.config);
    let (mut config, load_error) = match WatcherConfig::load(&config_path) {
        Ok(cfg) => (cfg, None),
        Err(e) => (WatcherConfig::default(), Some(e.to_string())),
    };

    let filter = args
        .verbosity
        .clone()
        .unwrap_or_else(|| config.log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .init();

    match load_error {
        None => tracing::info!("Loaded configuration from {}", config_path.display()),
        Some(e) => tracing::warn!(
            "Could not load config from {}: {}. Using defaults.",
            config_path.display(),
            e
        ),
    }

    // CLI --file flag overrides the configured snapshot file.
    if let Some(file) = &args.file {
        config.snapshot_file = Some(file.to_string_lossy().into_owned());
    }
    config.validate(args.mock)?;

    tracing::info!("StakeWatch v0.1.0{}", if args.mock { " (mock mode)" } else { "" });
    tracing::info!("Source RPC: {}", config.source_rpc_url);
    tracing::info!("Destination RPC: {}", config.destination_rpc_url);
    tracing::info!("Epoch length: {} blocks", config.epoch_length);

    let contract = config.contract()?;
    let scanner = EventScanner::new(contract, &config.event_signature);
    let synchronizer = EpochSynchronizer::new(
        config.epoch_length,
        SnapshotBuilder::new(config.registry_stride)?,
    )?;

    let (source, dest, store): (
        Arc<dyn SourceChain>,
        Arc<dyn DestinationChain>,
        Arc<dyn CheckpointStore>,
    ) = if args.mock {
        let source = mock::seeded_source(
            config.start_block,
            config.block_confirmations,
            *scanner.topic(),
        )
        .await;
        (
            Arc::new(source),
            Arc::new(MockDestination::new()),
            Arc::new(InMemoryCheckpointStore::new()),
        )
    } else {
        let store = FileCheckpointStore::new(config.cursor_path(), config.snapshot_path());
        tracing::info!("Cursor file: {}", store.cursor_path().display());
        tracing::info!("Snapshot file: {}", store.snapshot_path().display());
        (
            Arc::new(EthRpcClient::new(&config.source_rpc_url, contract)?),
            Arc::new(RelayRpcClient::new(config.destination_rpc_url.clone())),
            Arc::new(store),
        )
    };

    let start = resume_height(store.as_ref(), config.start_block).await?;

    // Ctrl-C raises the stop signal; the poller finishes its current RPC
    // and exits at the top of its loop.
    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Received Ctrl-C, stopping");
                let _ = stop_tx.send(true);
            }
            Err(e) => tracing::error!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    let mut poller = BlockPoller::new(
        config.poller_config(start),
        source,
        dest,
        store,
        scanner,
        synchronizer,
        stop_rx,
    );

    if let Err(e) = poller.run().await {
        tracing::error!(
            "Watcher stopped at block {}: {}",
            poller.current_height(),
            e
        );
        return Err(e.into());
    }

    tracing::info!(
        "StakeWatch shut down gracefully at block {}",
        poller.current_height()
    );
    Ok(())
}
