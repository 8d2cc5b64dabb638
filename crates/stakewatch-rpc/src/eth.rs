// crates/stakewatch-rpc/src/eth.rs
//
// Ethereum client for the source chain, built on an ethers `Provider`.
//
// Block height and log queries go straight through the provider. Calls to
// the staking registry are encoded and decoded against a human-readable ABI.

use async_trait::async_trait;
use ethers::abi::parse_abi;
use ethers::contract::BaseContract;
use ethers::providers::{Http, JsonRpcClient, Middleware, Provider};
use ethers::types::transaction::eip2718::TypedTransaction;
use ethers::types::{Address as EthAddress, Filter, Log, TransactionRequest, H256, U256};

#[cfg(test)]
use ethers::providers::MockProvider;

use stakewatch_core::event::{uint_to_u128, uint_to_u64};
use stakewatch_core::{Address, LogFilter, RawLog, SourceChain, StakerInfo, WatcherError};

const GET_STAKERS_LENGTH: &str = "getStakersLength";
const STAKERS: &str = "stakers";
const STAKER_INFO: &str = "stakerInfo";

/// Registry functions read by the watcher. Only the leading `value` field
/// of `stakerInfo` is declared; trailing fields are ignored when decoding.
const REGISTRY_ABI: &[&str] = &[
    "function getStakersLength() view returns (uint256)",
    "function stakers(uint256) view returns (address)",
    "function stakerInfo(address) view returns (uint256)",
];

/// Source-chain client over an ethers provider.
#[derive(Debug)]
pub struct EthRpcClient<P> {
    provider: Provider<P>,
    /// Staking registry (and deposit event emitter) contract.
    registry: Address,
    abi: BaseContract,
}

impl EthRpcClient<Http> {
    /// Connect to an HTTP JSON-RPC endpoint.
    pub fn new(provider_url: &str, registry: Address) -> Result<Self, WatcherError> {
        let provider = Provider::<Http>::try_from(provider_url).map_err(|e| {
            WatcherError::Config(format!("Invalid source RPC url {}: {}", provider_url, e))
        })?;
        Self::with_provider(provider, registry)
    }
}

#[cfg(test)]
impl EthRpcClient<MockProvider> {
    pub fn new_mocked(provider: MockProvider, registry: Address) -> Self {
        Self::with_provider(Provider::new(provider), registry).unwrap()
    }
}

impl<P: JsonRpcClient> EthRpcClient<P> {
    pub fn with_provider(provider: Provider<P>, registry: Address) -> Result<Self, WatcherError> {
        let abi = parse_abi(REGISTRY_ABI)
            .map_err(|e| WatcherError::Config(format!("Invalid registry ABI: {}", e)))?;
        Ok(Self {
            provider,
            registry,
            abi: BaseContract::from(abi),
        })
    }

    pub fn registry(&self) -> &Address {
        &self.registry
    }

    /// Call a registry view function at the latest block.
    async fn call<A, D>(&self, function: &str, args: A) -> Result<D, WatcherError>
    where
        A: ethers::abi::Tokenize,
        D: ethers::abi::Detokenize,
    {
        let calldata = self
            .abi
            .encode(function, args)
            .map_err(|e| WatcherError::Decode(format!("Failed to encode {}: {}", function, e)))?;
        let tx: TypedTransaction = TransactionRequest::new()
            .to(EthAddress::from(self.registry))
            .data(calldata)
            .into();

        let output = self
            .provider
            .call(&tx, None)
            .await
            .map_err(|e| WatcherError::Network(format!("{} call failed: {}", function, e)))?;

        self.abi
            .decode_output(function, output)
            .map_err(|e| WatcherError::Decode(format!("Failed to decode {} output: {}", function, e)))
    }
}

/// Convert provider logs, dropping any the node marks as removed by a reorg.
fn convert_logs(logs: Vec<Log>, filter: &LogFilter) -> Vec<RawLog> {
    logs.into_iter()
        .filter_map(|log| {
            if log.removed == Some(true) {
                tracing::warn!(
                    "Skipping removed log in block range {}..={}",
                    filter.from_block,
                    filter.to_block
                );
                return None;
            }
            Some(RawLog {
                block_number: log.block_number.map(|n| n.as_u64()).unwrap_or_default(),
                topics: log.topics.iter().map(|t| t.to_fixed_bytes()).collect(),
                data: log.data.to_vec(),
            })
        })
        .collect()
}

#[async_trait]
impl<P: JsonRpcClient + 'static> SourceChain for EthRpcClient<P> {
    async fn latest_block(&self) -> Result<u64, WatcherError> {
        let height = self
            .provider
            .get_block_number()
            .await
            .map_err(|e| WatcherError::Network(format!("Failed to get latest block: {}", e)))?;
        Ok(height.as_u64())
    }

    async fn filter_logs(&self, filter: &LogFilter) -> Result<Vec<RawLog>, WatcherError> {
        let query = Filter::new()
            .address(EthAddress::from(filter.address))
            .topic0(H256::from(filter.topic))
            .from_block(filter.from_block)
            .to_block(filter.to_block);

        let logs = self.provider.get_logs(&query).await.map_err(|e| {
            WatcherError::Network(format!(
                "Log query for blocks {}..={} failed: {}",
                filter.from_block, filter.to_block, e
            ))
        })?;
        Ok(convert_logs(logs, filter))
    }

    async fn stakers_length(&self) -> Result<u64, WatcherError> {
        let length: U256 = self.call(GET_STAKERS_LENGTH, ()).await?;
        uint_to_u64(length)
    }

    async fn staker_at(&self, index: u64) -> Result<Address, WatcherError> {
        let staker: EthAddress = self.call(STAKERS, U256::from(index)).await?;
        Ok(Address::from(staker))
    }

    async fn staker_info(&self, staker: &Address) -> Result<StakerInfo, WatcherError> {
        let value: U256 = self.call(STAKER_INFO, EthAddress::from(*staker)).await?;
        Ok(StakerInfo {
            value: uint_to_u128(value)?,
        })
    }
}
