// crates/stakewatch-cli/src/commands/status.rs
//
// `stakewatch-cli status`: show where the watcher will resume and how far
// it is from the next epoch boundary.

use clap::Args;
use serde::Serialize;

use stakewatch_core::CheckpointStore;
use stakewatch_store::FileCheckpointStore;

use crate::output::{format_json, OutputFormat};

/// Arguments for the status command.
#[derive(Debug, Args)]
pub struct StatusCmd {
    /// Blocks per epoch, as configured for the daemon.
    #[arg(long, default_value_t = 1000)]
    pub epoch_length: u64,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Checkpoint summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    /// Next block the watcher will process.
    pub cursor: u64,
    /// Records in the committed snapshot.
    pub snapshot_size: usize,
    /// Active records in the committed snapshot.
    pub active_stakers: usize,
    pub epoch_length: u64,
    /// Epoch the cursor falls in.
    pub epoch: u64,
    /// First boundary at or after the cursor.
    pub next_boundary: u64,
    pub blocks_to_boundary: u64,
}

impl StatusReport {
    pub fn new(cursor: u64, snapshot_size: usize, active_stakers: usize, epoch_length: u64) -> Self {
        let epoch_length = epoch_length.max(1);
        let epoch = cursor / epoch_length;
        let next_boundary = if cursor % epoch_length == 0 {
            cursor
        } else {
            (epoch + 1).saturating_mul(epoch_length)
        };
        Self {
            cursor,
            snapshot_size,
            active_stakers,
            epoch_length,
            epoch,
            next_boundary,
            blocks_to_boundary: next_boundary.saturating_sub(cursor),
        }
    }
}

/// Run the status command.
pub async fn run(cmd: &StatusCmd, store: &FileCheckpointStore) -> Result<(), Box<dyn std::error::Error>> {
    if cmd.epoch_length == 0 {
        return Err("--epoch-length must be at least 1".into());
    }

    let cursor = store.read_cursor().await?;
    let snapshot = store.read_snapshot().await?;
    let active = snapshot.iter().filter(|r| r.is_active).count();
    let report = StatusReport::new(cursor, snapshot.len(), active, cmd.epoch_length);

    match OutputFormat::from_json_flag(cmd.json) {
        OutputFormat::Json => println!("{}", format_json(&report)),
        OutputFormat::Table => {
            println!("StakeWatch v0.1.0");
            println!();
            println!("Checkpoint");
            println!("----------");
            println!("  Cursor file:    {}", store.cursor_path().display());
            println!("  Snapshot file:  {}", store.snapshot_path().display());
            println!("  Next block:     {}", report.cursor);
            println!(
                "  Snapshot:       {} stakers ({} active)",
                report.snapshot_size, report.active_stakers
            );
            println!(
                "  Epoch:          {} (length {})",
                report.epoch, report.epoch_length
            );
            println!(
                "  Next boundary:  {} ({} blocks away)",
                report.next_boundary, report.blocks_to_boundary
            );
        }
    }

    Ok(())
}
