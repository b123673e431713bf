//! `eth_getTransactionReceipt` over JSON-RPC, one endpoint per chain.

use async_trait::async_trait;
use np_02_verification::{ChainClient, ChainError, TransactionReceipt};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::debug;

pub struct RpcChainClient {
    client: reqwest::Client,
    endpoints: HashMap<u64, String>,
}

impl RpcChainClient {
    pub fn new(client: reqwest::Client, endpoints: HashMap<u64, String>) -> Self {
        Self { client, endpoints }
    }

    pub fn has_chain(&self, chain_id: u64) -> bool {
        self.endpoints.contains_key(&chain_id)
    }
}

/// Extract the receipt from a JSON-RPC response body.
///
/// A `null` result (unknown or pending transaction) is `Ok(None)`.
pub fn parse_receipt_response(body: Value) -> Result<Option<TransactionReceipt>, ChainError> {
    if let Some(error) = body.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(ChainError::Rpc(message));
    }
    match body.get("result") {
        None | Some(Value::Null) => Ok(None),
        Some(result) => serde_json::from_value(result.clone())
            .map(Some)
            .map_err(|e| ChainError::Rpc(format!("malformed receipt: {e}"))),
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn get_transaction_receipt(
        &self,
        chain_id: u64,
        tx_hash: &str,
    ) -> Result<Option<TransactionReceipt>, ChainError> {
        let endpoint = self
            .endpoints
            .get(&chain_id)
            .ok_or(ChainError::UnknownChain(chain_id))?;
        debug!(chain_id, tx_hash, "[np-02] eth_getTransactionReceipt");

        let body: Value = self
            .client
            .post(endpoint)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "eth_getTransactionReceipt",
                "params": [tx_hash],
            }))
            .send()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?
            .error_for_status()
            .map_err(|e| ChainError::Rpc(e.to_string()))?
            .json()
            .await
            .map_err(|e| ChainError::Rpc(e.to_string()))?;

        parse_receipt_response(body)
    }
}
