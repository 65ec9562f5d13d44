//! Ethereum JSON-RPC implementation of [`ChainReader`].
//!
//! Speaks JSON-RPC 2.0 over HTTP to a single endpoint (Infura, Alchemy, or
//! a self-hosted node). Only the handful of read methods the engine needs
//! are implemented: `eth_call` for `balanceOf`, `eth_getLogs` for transfer
//! history, `eth_blockNumber` and `eth_getBlockByNumber` for block metadata.

use crate::reader::{ChainReader, TransferEvent};
use crate::ChainError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use vouch_types::{Address, Timestamp};

/// Default timeout for a single RPC request.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// 4-byte selector of `balanceOf(address)`.
const BALANCE_OF_SELECTOR: &str = "70a08231";

/// topic0 of `Transfer(address,address,uint256)` (keccak-256 of the signature).
const TRANSFER_TOPIC: &str =
    "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

/// JSON-RPC client for read-only chain queries.
pub struct JsonRpcChainReader {
    endpoint: String,
    http_client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<serde_json::Value>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct LogEntry {
    #[serde(rename = "blockNumber")]
    block_number: String,
}

#[derive(Debug, Deserialize)]
struct BlockHeader {
    timestamp: String,
}

impl JsonRpcChainReader {
    /// Create a reader for `endpoint` with default timeout settings.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    /// Create a reader with a custom per-request timeout.
    pub fn with_timeout(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            endpoint: endpoint.into(),
            http_client,
        }
    }

    /// POST one JSON-RPC call and return its `result` field.
    async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, ChainError> {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChainError::Unreachable(format!("request timed out: {e}"))
                } else if e.is_connect() {
                    ChainError::Unreachable(format!("connection failed: {e}"))
                } else {
                    ChainError::Rpc(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(ChainError::Rpc(format!("HTTP status {}", response.status())));
        }

        let rpc: RpcResponse = response.json().await.map_err(|e| {
            ChainError::InvalidResponse(format!("failed to parse RPC envelope: {e}"))
        })?;

        if let Some(err) = rpc.error {
            return Err(ChainError::Rpc(format!("{} (code {})", err.message, err.code)));
        }
        rpc.result
            .ok_or_else(|| ChainError::InvalidResponse("response has neither result nor error".into()))
    }
}

#[async_trait]
impl ChainReader for JsonRpcChainReader {
    async fn balance_of(&self, contract: &Address, wallet: &Address)
        -> Result<u128, ChainError>
    {
        let params = serde_json::json!([
            { "to": contract.as_str(), "data": encode_balance_of(wallet) },
            "latest",
        ]);
        let result = self.call("eth_call", params).await?;
        let raw = result
            .as_str()
            .ok_or_else(|| ChainError::InvalidResponse("eth_call result is not a string".into()))?;
        parse_quantity_u128(raw)
    }

    async fn latest_block(&self) -> Result<u64, ChainError> {
        let result = self.call("eth_blockNumber", serde_json::json!([])).await?;
        let raw = result.as_str().ok_or_else(|| {
            ChainError::InvalidResponse("eth_blockNumber result is not a string".into())
        })?;
        parse_quantity_u64(raw)
    }

    async fn block_timestamp(&self, block: u64) -> Result<Timestamp, ChainError> {
        let params = serde_json::json!([format!("0x{block:x}"), false]);
        let result = self.call("eth_getBlockByNumber", params).await?;
        let header: BlockHeader = serde_json::from_value(result).map_err(|e| {
            ChainError::InvalidResponse(format!("failed to parse block header: {e}"))
        })?;
        Ok(Timestamp::new(parse_quantity_u64(&header.timestamp)?))
    }

    async fn transfer_events_to(
        &self,
        contract: &Address,
        wallet: &Address,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<TransferEvent>, ChainError> {
        let params = serde_json::json!([{
            "address": contract.as_str(),
            "fromBlock": format!("0x{from_block:x}"),
            "toBlock": format!("0x{to_block:x}"),
            // topic1 (from) unconstrained, topic2 (to) pinned to the wallet.
            "topics": [TRANSFER_TOPIC, serde_json::Value::Null, address_topic(wallet)],
        }]);
        let result = self.call("eth_getLogs", params).await?;
        let logs: Vec<LogEntry> = serde_json::from_value(result)
            .map_err(|e| ChainError::InvalidResponse(format!("failed to parse logs: {e}")))?;

        logs.iter()
            .map(|log| {
                Ok(TransferEvent {
                    block_number: parse_quantity_u64(&log.block_number)?,
                })
            })
            .collect()
    }
}

/// ABI-encode a `balanceOf(address)` call: selector + left-padded address.
fn encode_balance_of(wallet: &Address) -> String {
    format!("0x{BALANCE_OF_SELECTOR}{:0>64}", wallet.hex_part())
}

/// Encode an address as a 32-byte log topic.
fn address_topic(wallet: &Address) -> String {
    format!("0x{:0>64}", wallet.hex_part())
}

/// Parse a 0x-prefixed hex quantity into u64.
fn parse_quantity_u64(raw: &str) -> Result<u64, ChainError> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| ChainError::InvalidResponse(format!("quantity missing 0x prefix: {raw}")))?;
    u64::from_str_radix(digits, 16)
        .map_err(|e| ChainError::InvalidResponse(format!("bad hex quantity {raw}: {e}")))
}

/// Parse a 0x-prefixed hex quantity into u128, saturating on overflow.
///
/// Balances are uint256 on-chain but only ever compared against zero here,
/// so saturation cannot change an eligibility outcome.
fn parse_quantity_u128(raw: &str) -> Result<u128, ChainError> {
    let digits = raw
        .strip_prefix("0x")
        .ok_or_else(|| ChainError::InvalidResponse(format!("quantity missing 0x prefix: {raw}")))?;
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        return Ok(0);
    }
    if trimmed.len() > 32 {
        return Ok(u128::MAX);
    }
    u128::from_str_radix(trimmed, 16)
        .map_err(|e| ChainError::InvalidResponse(format!("bad hex quantity {raw}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wallet() -> Address {
        Address::parse("0x5af0d9827e0c53e4799bb226655a1de152a425a5").unwrap()
    }

    #[test]
    fn balance_of_calldata_is_selector_plus_padded_address() {
        let data = encode_balance_of(&wallet());
        assert_eq!(data.len(), 2 + 8 + 64);
        assert!(data.starts_with("0x70a08231"));
        assert!(data.ends_with("5af0d9827e0c53e4799bb226655a1de152a425a5"));
        assert!(data["0x70a08231".len()..].starts_with("000000000000000000000000"));
    }

    #[test]
    fn address_topic_is_32_bytes() {
        let topic = address_topic(&wallet());
        assert_eq!(topic.len(), 2 + 64);
        assert!(topic.starts_with("0x000000000000000000000000"));
    }

    #[test]
    fn parses_u64_quantities() {
        assert_eq!(parse_quantity_u64("0x0").unwrap(), 0);
        assert_eq!(parse_quantity_u64("0x10").unwrap(), 16);
        assert!(parse_quantity_u64("ff").is_err());
    }

    #[test]
    fn parses_u128_quantities_with_padding() {
        let padded = format!("0x{:064x}", 3);
        assert_eq!(parse_quantity_u128(&padded).unwrap(), 3);
        assert_eq!(parse_quantity_u128("0x0").unwrap(), 0);
    }

    #[test]
    fn oversized_balance_saturates() {
        let huge = format!("0x{}", "f".repeat(64));
        assert_eq!(parse_quantity_u128(&huge).unwrap(), u128::MAX);
    }
}
