// crates/stakewatch-rpc/src/relay.rs
//
// Destination-chain client: POSTs stake-info updates to a relay endpoint
// that signs and submits the extrinsic on the destination chain.
//
// Request:  { "method": <call>, "params": { "stake_infos": [StakerRecord] } }
// Response: { "success": bool, "result": any, "error": string? }

use async_trait::async_trait;
use serde::Serialize;

use stakewatch_core::{DestinationChain, StakerRecord, WatcherError};

use crate::jsonrpc::{RelayRequest, RelayResponse};

#[derive(Debug, Serialize)]
struct StakeInfoParams<'a> {
    stake_infos: &'a [StakerRecord],
}

/// HTTP client for the destination relay.
#[derive(Debug, Clone)]
pub struct RelayRpcClient {
    http: reqwest::Client,
    url: String,
}

impl RelayRpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl DestinationChain for RelayRpcClient {
    async fn submit_tx(&self, call: &str, payload: &[StakerRecord]) -> Result<(), WatcherError> {
        let request = RelayRequest {
            method: call.to_string(),
            params: StakeInfoParams {
                stake_infos: payload,
            },
        };

        let resp = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| WatcherError::Submission(format!("HTTP error: {}", e)))?;

        let rpc_resp: RelayResponse = resp
            .json()
            .await
            .map_err(|e| WatcherError::Submission(format!("Failed to parse response: {}", e)))?;

        if !rpc_resp.success {
            return Err(WatcherError::Submission(
                rpc_resp
                    .error
                    .unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }

        tracing::debug!("{} accepted with result {:?}", call, rpc_resp.result);
        Ok(())
    }
}
