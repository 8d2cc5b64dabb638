// crates/stakewatch-cli/src/commands/mod.rs
//
// Command module declarations for the StakeWatch CLI.

pub mod snapshot;
pub mod status;
