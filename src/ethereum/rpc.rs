//! Raw JSON-RPC shapes for `eth_getBlockByNumber` and `eth_getTransactionByHash`

use alloy::primitives::{Address, Bloom, Bytes, B256, B64, U256, U64};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcBlock {
    #[serde(default)]
    pub hash: Option<B256>,
    pub parent_hash: B256,
    #[serde(rename = "sha3Uncles")]
    pub uncles_hash: B256,
    pub miner: Address,
    pub state_root: B256,
    pub transactions_root: B256,
    pub receipts_root: B256,
    pub logs_bloom: Bloom,
    #[serde(default)]
    pub difficulty: U256,
    pub number: U64,
    pub gas_limit: U64,
    pub gas_used: U64,
    pub timestamp: U64,
    #[serde(default)]
    pub extra_data: Bytes,
    #[serde(default)]
    pub mix_hash: B256,
    #[serde(default)]
    pub nonce: B64,
    #[serde(default)]
    pub base_fee_per_gas: Option<U256>,
    #[serde(default)]
    pub withdrawals_root: Option<B256>,
    #[serde(default)]
    pub blob_gas_used: Option<U64>,
    #[serde(default)]
    pub excess_blob_gas: Option<U64>,
    #[serde(default)]
    pub parent_beacon_block_root: Option<B256>,
    #[serde(default)]
    pub requests_hash: Option<B256>,
    /// Full transaction objects; blocks are always requested with `true`
    #[serde(default)]
    pub transactions: Vec<RpcTransaction>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransaction {
    pub hash: B256,
    pub nonce: U64,
    #[serde(default)]
    pub block_hash: Option<B256>,
    #[serde(default)]
    pub block_number: Option<U64>,
    #[serde(default)]
    pub transaction_index: Option<U64>,
    pub from: Address,
    #[serde(default)]
    pub to: Option<Address>,
    #[serde(default)]
    pub value: U256,
    #[serde(default)]
    pub gas_price: Option<U256>,
    #[serde(default)]
    pub max_fee_per_gas: Option<U256>,
    pub gas: U64,
    #[serde(default)]
    pub input: Bytes,
    #[serde(default)]
    pub v: Option<U256>,
    #[serde(default)]
    pub y_parity: Option<U64>,
    #[serde(default)]
    pub r: Option<U256>,
    #[serde(default)]
    pub s: Option<U256>,
    #[serde(default)]
    pub chain_id: Option<U64>,
    #[serde(default, rename = "type")]
    pub tx_type: Option<U64>,
    #[serde(default)]
    pub blob_versioned_hashes: Vec<B256>,
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_dynamic_fee_transaction() {
        let raw = json!({
            "hash": "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b",
            "nonce": "0x15",
            "blockHash": "0x1d59ff54b1eb26b013ce3cb5fc9dab3705b415a67127a003c3e61eb445bb8df2",
            "blockNumber": "0x5daf3b",
            "transactionIndex": "0x41",
            "from": "0xa7d9ddbe1f17865597fbd27ec712455208b6b76d",
            "to": "0xf02c1c8e6114b1dbe8937a39260b5b0a374432bb",
            "value": "0xf3dbb76162000",
            "gasPrice": "0x4a817c800",
            "maxFeePerGas": "0x4a817c800",
            "maxPriorityFeePerGas": "0x3b9aca00",
            "gas": "0xc350",
            "input": "0x68656c6c6f21",
            "v": "0x1",
            "yParity": "0x1",
            "r": "0x1b5e176d927f8e9ab405058b2d2457392da3e20f328b16ddabcebc33eaac5fea",
            "s": "0x4ba69724e8f69de52f0125ad8b3c5c2cef33019bac3249e2c0a2192766d1721c",
            "chainId": "0x1",
            "type": "0x2",
            "accessList": []
        });

        let tx: RpcTransaction = serde_json::from_value(raw).unwrap();
        assert_eq!(tx.nonce, U64::from(0x15));
        assert_eq!(tx.block_number, Some(U64::from(0x5daf3b)));
        assert_eq!(tx.tx_type, Some(U64::from(2)));
        assert_eq!(tx.input.as_ref(), b"hello!");
        assert!(tx.blob_versioned_hashes.is_empty());
    }

    #[test]
    fn test_deserialize_pending_contract_creation() {
        let raw = json!({
            "hash": "0x88df016429689c079f3b2f6ad39fa052532c56795b733da78a91ebe6a713944b",
            "nonce": "0x0",
            "blockHash": null,
            "blockNumber": null,
            "transactionIndex": null,
            "from": "0xa7d9ddbe1f17865597fbd27ec712455208b6b76d",
            "to": null,
            "value": "0x0",
            "gasPrice": "0x1",
            "gas": "0x5208",
            "input": "0x6080"
        });

        let tx: RpcTransaction = serde_json::from_value(raw).unwrap();
        assert!(tx.block_hash.is_none());
        assert!(tx.to.is_none());
        assert!(tx.tx_type.is_none());
    }
}
