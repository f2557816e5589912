use alloy::{
    primitives::{Address, Bytes, B256},
    providers::{Provider, ProviderBuilder, RootProvider},
    rpc::types::TransactionRequest,
    transports::http::{reqwest::Url, Client, Http},
};
use async_trait::async_trait;
use lru::LruCache;
use std::fmt::Display;
use std::future::IntoFuture;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::rpc::{RpcBlock, RpcTransaction};
use super::utils::interpret_rpc_error;
use super::ChainError;

/// The node operations the gateway relies on.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn block_number(&self) -> Result<u64, ChainError>;

    /// Block with full transaction objects, `None` when the node has no such block.
    async fn block_by_number(&self, number: u64) -> Result<Option<RpcBlock>, ChainError>;

    async fn transaction_by_hash(&self, hash: B256) -> Result<Option<RpcTransaction>, ChainError>;

    /// `eth_call` against the latest block.
    async fn call_contract(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>, ChainError>;

    async fn pending_nonce_at(&self, address: Address) -> Result<u64, ChainError>;

    async fn suggest_gas_price(&self) -> Result<u128, ChainError>;

    async fn chain_id(&self) -> Result<u64, ChainError>;

    /// Broadcast a signed, EIP-2718 encoded transaction and return its hash.
    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256, ChainError>;
}

/// Hands out a [`ChainClient`] for a node address.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn client(&self, node_url: &str) -> Result<Arc<dyn ChainClient>, ChainError>;
}

/// [`ChainClient`] backed by an alloy HTTP provider. Every call is bounded
/// by the configured request timeout.
#[derive(Debug, Clone)]
pub struct RpcProvider {
    provider: RootProvider<Http<Client>>,
    timeout: Duration,
}

impl RpcProvider {
    pub fn connect(node_url: &str, timeout: Duration) -> Result<Self, ChainError> {
        let url = Url::parse(node_url).map_err(|e| ChainError::InvalidEndpoint {
            url: node_url.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ChainError::InvalidEndpoint {
                url: node_url.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        let provider = ProviderBuilder::new().on_http(url);
        Ok(Self { provider, timeout })
    }

    async fn bounded<F, T, E>(&self, method: &str, request: F) -> Result<T, ChainError>
    where
        F: IntoFuture<Output = Result<T, E>>,
        E: Display,
    {
        match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::debug!("{} failed: {}", method, e);
                Err(ChainError::Rpc(interpret_rpc_error(&e.to_string())))
            }
            Err(_) => Err(ChainError::Timeout {
                method: method.to_string(),
                timeout: self.timeout,
            }),
        }
    }
}

#[async_trait]
impl ChainClient for RpcProvider {
    async fn block_number(&self) -> Result<u64, ChainError> {
        self.bounded("eth_blockNumber", self.provider.get_block_number())
            .await
    }

    async fn block_by_number(&self, number: u64) -> Result<Option<RpcBlock>, ChainError> {
        let params = (format!("0x{:x}", number), true);
        self.bounded(
            "eth_getBlockByNumber",
            self.provider
                .raw_request::<_, Option<RpcBlock>>("eth_getBlockByNumber".into(), params),
        )
        .await
    }

    async fn transaction_by_hash(
        &self,
        hash: B256,
    ) -> Result<Option<RpcTransaction>, ChainError> {
        let method = "eth_getTransactionByHash";
        self.bounded(
            method,
            self.provider
                .raw_request::<_, Option<RpcTransaction>>(method.into(), (hash,)),
        )
        .await
    }

    async fn call_contract(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>, ChainError> {
        let request = TransactionRequest::default()
            .to(to)
            .input(Bytes::from(data).into());
        let output = self
            .bounded("eth_call", self.provider.call(&request))
            .await?;
        Ok(output.to_vec())
    }

    async fn pending_nonce_at(&self, address: Address) -> Result<u64, ChainError> {
        self.bounded(
            "eth_getTransactionCount",
            self.provider.get_transaction_count(address).pending(),
        )
        .await
    }

    async fn suggest_gas_price(&self) -> Result<u128, ChainError> {
        self.bounded("eth_gasPrice", self.provider.get_gas_price())
            .await
    }

    async fn chain_id(&self) -> Result<u64, ChainError> {
        self.bounded("eth_chainId", self.provider.get_chain_id())
            .await
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256, ChainError> {
        let pending = self
            .bounded("eth_sendRawTransaction", self.provider.send_raw_transaction(raw))
            .await?;
        Ok(*pending.tx_hash())
    }
}

/// Caches providers per node address, keeping at most `capacity` of them.
///
/// Node addresses come from request headers, so the least recently used
/// provider is dropped once the cache is full.
pub struct ProviderManager {
    providers: Mutex<LruCache<String, Arc<RpcProvider>>>,
    timeout: Duration,
}

impl ProviderManager {
    pub fn new(timeout: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            providers: Mutex::new(LruCache::new(capacity)),
            timeout,
        }
    }

    pub async fn get_provider(&self, node_url: &str) -> Result<Arc<RpcProvider>, ChainError> {
        let mut providers = self.providers.lock().await;
        if let Some(provider) = providers.get(node_url) {
            return Ok(provider.clone());
        }

        let provider = Arc::new(RpcProvider::connect(node_url, self.timeout)?);
        tracing::debug!("Created provider for {}", node_url);
        if let Some((evicted, _)) = providers.push(node_url.to_string(), provider.clone()) {
            tracing::debug!("Dropped cached provider for {}", evicted);
        }
        Ok(provider)
    }

    pub async fn cached_count(&self) -> usize {
        self.providers.lock().await.len()
    }
}

#[async_trait]
impl ClientFactory for ProviderManager {
    async fn client(&self, node_url: &str) -> Result<Arc<dyn ChainClient>, ChainError> {
        let provider: Arc<dyn ChainClient> = self.get_provider(node_url).await?;
        Ok(provider)
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use alloy::primitives::keccak256;
    use std::sync::Mutex;

    /// In-memory node used by the glue and HTTP tests.
    #[derive(Debug, Default)]
    pub(crate) struct MockChain {
        pub(crate) blocks: Vec<RpcBlock>,
        pub(crate) transactions: Vec<RpcTransaction>,
        pub(crate) call_output: Vec<u8>,
        pub(crate) nonce: u64,
        pub(crate) gas_price: u128,
        pub(crate) chain_id: u64,
        pub(crate) fail_with: Option<String>,
        pub(crate) time_out: bool,
        pub(crate) calls: Mutex<Vec<(Address, Vec<u8>)>>,
        pub(crate) sent: Mutex<Vec<Vec<u8>>>,
    }

    impl MockChain {
        fn check(&self, method: &str) -> Result<(), ChainError> {
            if self.time_out {
                return Err(ChainError::Timeout {
                    method: method.to_string(),
                    timeout: Duration::from_secs(1),
                });
            }
            match &self.fail_with {
                Some(reason) => Err(ChainError::Rpc(reason.clone())),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl ChainClient for MockChain {
        async fn block_number(&self) -> Result<u64, ChainError> {
            self.check("eth_blockNumber")?;
            Ok(self
                .blocks
                .iter()
                .map(|b| b.number.to::<u64>())
                .max()
                .unwrap_or_default())
        }

        async fn block_by_number(&self, number: u64) -> Result<Option<RpcBlock>, ChainError> {
            self.check("eth_getBlockByNumber")?;
            Ok(self
                .blocks
                .iter()
                .find(|b| b.number.to::<u64>() == number)
                .cloned())
        }

        async fn transaction_by_hash(
            &self,
            hash: B256,
        ) -> Result<Option<RpcTransaction>, ChainError> {
            self.check("eth_getTransactionByHash")?;
            Ok(self.transactions.iter().find(|t| t.hash == hash).cloned())
        }

        async fn call_contract(&self, to: Address, data: Vec<u8>) -> Result<Vec<u8>, ChainError> {
            self.check("eth_call")?;
            self.calls.lock().unwrap().push((to, data));
            Ok(self.call_output.clone())
        }

        async fn pending_nonce_at(&self, _address: Address) -> Result<u64, ChainError> {
            self.check("eth_getTransactionCount")?;
            Ok(self.nonce)
        }

        async fn suggest_gas_price(&self) -> Result<u128, ChainError> {
            self.check("eth_gasPrice")?;
            Ok(self.gas_price)
        }

        async fn chain_id(&self) -> Result<u64, ChainError> {
            self.check("eth_chainId")?;
            Ok(self.chain_id)
        }

        async fn send_raw_transaction(&self, raw: &[u8]) -> Result<B256, ChainError> {
            self.check("eth_sendRawTransaction")?;
            self.sent.lock().unwrap().push(raw.to_vec());
            Ok(keccak256(raw))
        }
    }

    /// Always returns the same client and records which node was asked for.
    pub(crate) struct MockFactory {
        pub(crate) chain: Arc<MockChain>,
        pub(crate) requested: Mutex<Vec<String>>,
    }

    impl MockFactory {
        pub(crate) fn new(chain: MockChain) -> Self {
            Self {
                chain: Arc::new(chain),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ClientFactory for MockFactory {
        async fn client(&self, node_url: &str) -> Result<Arc<dyn ChainClient>, ChainError> {
            self.requested.lock().unwrap().push(node_url.to_string());
            let chain: Arc<dyn ChainClient> = self.chain.clone();
            Ok(chain)
        }
    }
}
