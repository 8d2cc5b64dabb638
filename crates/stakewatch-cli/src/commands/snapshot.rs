// crates/stakewatch-cli/src/commands/snapshot.rs
//
// `stakewatch-cli snapshot`: print the last committed stake snapshot in
// rank order.

use clap::Args;
use tabled::Tabled;

use stakewatch_core::{CheckpointStore, StakerRecord};
use stakewatch_store::FileCheckpointStore;

use crate::output::{format_json, format_table, OutputFormat};

/// Arguments for the snapshot command.
#[derive(Debug, Args)]
pub struct SnapshotCmd {
    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// A row in the snapshot table.
#[derive(Debug, Tabled)]
pub struct SnapshotRow {
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[tabled(rename = "Staker")]
    pub staker: String,
    #[tabled(rename = "Locked Balance")]
    pub locked_balance: u128,
    #[tabled(rename = "Active")]
    pub active: String,
    #[tabled(rename = "Work")]
    pub work_count: u32,
}

pub fn rows(snapshot: &[StakerRecord]) -> Vec<SnapshotRow> {
    snapshot
        .iter()
        .enumerate()
        .map(|(i, record)| SnapshotRow {
            rank: i + 1,
            staker: record.work_base().to_string(),
            locked_balance: record.locked_balance,
            active: if record.is_active { "yes" } else { "no" }.to_string(),
            work_count: record.work_count,
        })
        .collect()
}

/// Run the snapshot command.
pub async fn run(cmd: &SnapshotCmd, store: &FileCheckpointStore) -> Result<(), Box<dyn std::error::Error>> {
    let snapshot = store.read_snapshot().await?;

    match OutputFormat::from_json_flag(cmd.json) {
        OutputFormat::Json => println!("{}", format_json(&snapshot)),
        OutputFormat::Table => {
            if snapshot.is_empty() {
                println!(
                    "No snapshot committed yet ({})",
                    store.snapshot_path().display()
                );
                return Ok(());
            }
            println!("{}", format_table(&rows(&snapshot)));
            println!();
            println!("{} stakers", snapshot.len());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stakewatch_core::Address;

    #[test]
    fn rows_follow_snapshot_order() {
        let snapshot = vec![
            StakerRecord::new(Address::from_bytes([2; 20]), 900),
            StakerRecord::new(Address::from_bytes([1; 20]), 100).stopped(),
        ];
        let rows = rows(&snapshot);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[0].staker, format!("0x{}", "02".repeat(20)));
        assert_eq!(rows[0].active, "yes");
        assert_eq!(rows[1].active, "no");
        assert_eq!(rows[1].locked_balance, 100);
    }

    #[test]
    fn table_renders_headers() {
        let snapshot = vec![StakerRecord::new(Address::from_bytes([3; 20]), 5)];
        let table = format_table(&rows(&snapshot));
        assert!(table.contains("Locked Balance"));
        assert!(table.contains("Rank"));
    }
}
