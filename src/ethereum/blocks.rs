use anyhow::{Context, Result};

use super::provider::ChainClient;
use super::rpc::RpcBlock;
use super::transaction::map_transaction;
use super::{Block, BlocksResponse, ChainError, Header};

pub const DEFAULT_BLOCK_COUNT: u64 = 3;

/// Which blocks a `/blocks` request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    /// First (newest) block; `None` means the chain head
    pub start: Option<u64>,
    pub count: u64,
}

impl BlockRange {
    /// Build a range from raw query values.
    ///
    /// A missing, non-numeric or non-positive count falls back to
    /// [`DEFAULT_BLOCK_COUNT`] and is capped at `max_count`. A missing,
    /// invalid or zero start means the latest block.
    pub fn from_query(count: Option<&str>, start: Option<&str>, max_count: u64) -> Self {
        let count = count
            .and_then(|c| c.trim().parse::<i64>().ok())
            .filter(|c| *c > 0)
            .map(|c| c as u64)
            .unwrap_or(DEFAULT_BLOCK_COUNT)
            .min(max_count.max(1));

        let start = start
            .and_then(|b| b.trim().parse::<i64>().ok())
            .filter(|b| *b > 0)
            .map(|b| b as u64);

        Self { start, count }
    }
}

pub fn map_header(block: &RpcBlock) -> Header {
    Header {
        parent_hash: block.parent_hash.to_string(),
        uncle_hash: block.uncles_hash.to_string(),
        miner: block.miner.to_checksum(None),
        root: block.state_root.to_string(),
        tx_hash: block.transactions_root.to_string(),
        receipt_hash: block.receipts_root.to_string(),
        bloom: block.logs_bloom.to_string(),
        difficulty: block.difficulty.to_string(),
        number: block.number.to::<u64>().to_string(),
        gas_limit: block.gas_limit.to(),
        gas_used: block.gas_used.to(),
        timestamp: block.timestamp.to(),
        extra: block.extra_data.to_string(),
        mix_digest: block.mix_hash.to_string(),
        nonce: block.nonce.to_string(),
        base_fee: block.base_fee_per_gas.unwrap_or_default().to_string(),
        withdrawals_hash: block.withdrawals_root.unwrap_or_default().to_string(),
        blob_gas_used: block.blob_gas_used.map(|g| g.to()).unwrap_or_default(),
        excess_blob_gas: block.excess_blob_gas.map(|g| g.to()).unwrap_or_default(),
        parent_beacon_root: block.parent_beacon_block_root.unwrap_or_default().to_string(),
        requests_hash: block.requests_hash.unwrap_or_default().to_string(),
    }
}

pub fn map_block(block: &RpcBlock) -> Block {
    Block {
        header: map_header(block),
        transactions: block.transactions.iter().map(map_transaction).collect(),
    }
}

/// Fetch up to `range.count` blocks, newest first, walking backwards from
/// `range.start` (or the chain head) and stopping at genesis.
pub async fn get_blocks(client: &dyn ChainClient, range: BlockRange) -> Result<BlocksResponse> {
    let start = match range.start {
        Some(number) => number,
        None => client
            .block_number()
            .await
            .context("Failed to fetch latest block number")?,
    };

    tracing::debug!("Fetching {} blocks starting at {}", range.count, start);

    let mut blocks = Vec::new();
    for offset in 0..range.count {
        let Some(number) = start.checked_sub(offset) else {
            break;
        };

        let block = client
            .block_by_number(number)
            .await
            .with_context(|| format!("Failed to fetch block {}", number))?
            .ok_or_else(|| ChainError::NotFound(format!("Block {}", number)))?;

        blocks.push(map_block(&block));
    }

    Ok(BlocksResponse { blocks })
}
