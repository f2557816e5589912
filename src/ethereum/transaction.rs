use alloy::primitives::{B256, U256};
use anyhow::{Context, Result};

use super::provider::ChainClient;
use super::rpc::RpcTransaction;
use super::Transaction;

/// Name of an EIP-2718 transaction type.
pub fn transaction_type_name(tx_type: u64) -> &'static str {
    match tx_type {
        0 => "legacy",
        1 => "access_list",
        2 => "dynamic_fee",
        3 => "blob",
        4 => "set_code",
        _ => "unknown",
    }
}

/// What a transaction does, judged from its recipient and call data.
pub fn classify_method(to_is_set: bool, input: &[u8]) -> &'static str {
    if !to_is_set {
        "contract_creation"
    } else if input.is_empty() {
        "native_transfer"
    } else {
        "contract_call"
    }
}

/// Map a node transaction into the gateway's response shape.
pub fn map_transaction(tx: &RpcTransaction) -> Transaction {
    // Fee-market transactions may omit `gasPrice`; report the fee cap instead
    let gas_price = tx.gas_price.or(tx.max_fee_per_gas).unwrap_or_default();
    let v = tx
        .v
        .or_else(|| tx.y_parity.map(|p| U256::from(p.to::<u64>())))
        .unwrap_or_default();

    Transaction {
        hash: tx.hash.to_string(),
        nonce: tx.nonce.to(),
        block_hash: tx.block_hash.map(|h| h.to_string()).unwrap_or_default(),
        blob_hashes: tx.blob_versioned_hashes.iter().map(|h| h.to_string()).collect(),
        block_number: tx
            .block_number
            .map(|n| n.to::<u64>().to_string())
            .unwrap_or_default(),
        transaction_index: tx.transaction_index.map(|i| i.to()).unwrap_or_default(),
        from: tx.from.to_checksum(None),
        to: tx.to.map(|a| a.to_checksum(None)).unwrap_or_default(),
        value: tx.value.to_string(),
        gas_price: gas_price.to_string(),
        gas: tx.gas.to(),
        input: hex::encode(&tx.input),
        v: v.to_string(),
        r: tx.r.unwrap_or_default().to_string(),
        s: tx.s.unwrap_or_default().to_string(),
        chain_id: tx
            .chain_id
            .map(|c| c.to::<u64>().to_string())
            .unwrap_or_else(|| "0".to_string()),
        tx_type: transaction_type_name(tx.tx_type.map(|t| t.to()).unwrap_or(0)).to_string(),
        method: classify_method(tx.to.is_some(), &tx.input).to_string(),
        is_pending: tx.block_hash.is_none(),
    }
}

/// Fetch a transaction by hash. `None` when the node does not know it.
pub async fn get_transaction(client: &dyn ChainClient, hash: B256) -> Result<Option<Transaction>> {
    let tx = client
        .transaction_by_hash(hash)
        .await
        .with_context(|| format!("Failed to fetch transaction {}", hash))?;

    Ok(tx.as_ref().map(map_transaction))
}
