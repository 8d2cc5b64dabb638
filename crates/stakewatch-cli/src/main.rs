// crates/stakewatch-cli/src/main.rs
//
// CLI entrypoint for the StakeWatch operator tools.
//
// Reads the checkpoint files written by the daemon: the block cursor and
// the last committed stake snapshot.

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use commands::snapshot::SnapshotCmd;
use commands::status::StatusCmd;
use stakewatch_store::paths::{default_cursor_file, default_snapshot_file};
use stakewatch_store::FileCheckpointStore;

/// StakeWatch CLI: inspect relay watcher checkpoints.
#[derive(Parser, Debug)]
#[command(
    name = "stakewatch-cli",
    version = "0.1.0",
    about = "StakeWatch CLI: inspect the relay watcher's cursor and stake snapshot"
)]
struct Cli {
    /// Cursor file written by the daemon.
    #[arg(long, global = true)]
    cursor_file: Option<PathBuf>,

    /// Snapshot file written by the daemon.
    #[arg(long, global = true)]
    snapshot_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Debug, Subcommand)]
enum Commands {
    /// Show the cursor, snapshot size, and epoch position.
    Status(StatusCmd),

    /// Show the last committed stake snapshot.
    Snapshot(SnapshotCmd),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let store = FileCheckpointStore::new(
        cli.cursor_file.clone().unwrap_or_else(default_cursor_file),
        cli.snapshot_file.clone().unwrap_or_else(default_snapshot_file),
    );

    match &cli.command {
        Commands::Status(cmd) => commands::status::run(cmd, &store).await?,
        Commands::Snapshot(cmd) => commands::snapshot::run(cmd, &store).await?,
    }

    Ok(())
}
