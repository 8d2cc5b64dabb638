// crates/stakewatch-rpc/src/lib.rs
//
// stakewatch-rpc: Chain clients for StakeWatch.
//
// - `eth`: ethers-backed Ethereum client implementing `SourceChain`
//   (block height, log queries, staking registry calls).
// - `jsonrpc`: relay request/response envelopes.
// - `relay`: HTTP relay client implementing `DestinationChain`.
// - `mock`: scripted in-memory chains for tests and mock mode.

pub mod eth;
pub mod jsonrpc;
pub mod mock;
pub mod relay;

pub use eth::EthRpcClient;
pub use mock::{deposit_log, MockDestination, MockSourceChain};
pub use relay::RelayRpcClient;
