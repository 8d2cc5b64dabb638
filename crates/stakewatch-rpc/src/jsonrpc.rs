// crates/stakewatch-rpc/src/jsonrpc.rs
//
// Request and response envelopes spoken by the destination relay.

use serde::{Deserialize, Serialize};

/// Request envelope understood by the destination relay.
#[derive(Debug, Clone, Serialize)]
pub struct RelayRequest<P> {
    pub method: String,
    pub params: P,
}

/// Response envelope returned by the destination relay.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayResponse {
    pub success: bool,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
}
