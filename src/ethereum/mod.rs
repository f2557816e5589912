pub mod blocks;
pub mod contract;
pub mod provider;
pub mod rpc;
pub mod transaction;
pub mod utils;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::abi::NamedValues;

/// Failures talking to a JSON-RPC node.
#[derive(Debug, Error)]
pub enum ChainError {
    #[error("Invalid node address '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("{method} timed out after {timeout:?}")]
    Timeout { method: String, timeout: Duration },

    #[error("{0}")]
    Rpc(String),

    #[error("{0} not found")]
    NotFound(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlocksResponse {
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub header: Header,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    pub parent_hash: String,
    pub uncle_hash: String,
    pub miner: String,
    pub root: String,
    pub tx_hash: String,
    pub receipt_hash: String,
    pub bloom: String,
    pub difficulty: String,
    pub number: String,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub timestamp: u64,
    pub extra: String,
    pub mix_digest: String,
    pub nonce: String,
    pub base_fee: String,
    pub withdrawals_hash: String,
    pub blob_gas_used: u64,
    pub excess_blob_gas: u64,
    pub parent_beacon_root: String,
    pub requests_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: String,
    pub nonce: u64,
    pub block_hash: String,
    pub blob_hashes: Vec<String>,
    pub block_number: String,
    pub transaction_index: u64,
    pub from: String,
    pub to: String,
    pub value: String,
    pub gas_price: String,
    pub gas: u64,
    /// Call data as hex without a `0x` prefix
    pub input: String,
    pub v: String,
    pub r: String,
    pub s: String,
    pub chain_id: String,
    #[serde(rename = "type")]
    pub tx_type: String,
    pub method: String,
    pub is_pending: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DecodedCallData {
    pub function_name: String,
    pub args: NamedValues,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: String,
    pub state_mutability: String,
    pub selector: String,
    pub signature: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EthCallResult {
    pub raw_response: String,
    pub decoded: NamedValues,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentTransaction {
    pub transaction_hash: String,
}
