use alloy::network::Ethereum;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::BlockNumberOrTag;
use async_trait::async_trait;
use tokio::time::{sleep, Duration};
use tracing::warn;

use crate::oracle::{BlockOracle, BlockRef, OracleError, Sample};

const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// [`BlockOracle`] backed by a JSON-RPC node.
#[derive(Clone)]
pub struct RpcOracle {
    provider: DynProvider<Ethereum>,
    tries: u32,
    retry_delay: Duration,
}

impl RpcOracle {
    pub fn new(provider: DynProvider<Ethereum>) -> Self {
        Self { provider, tries: 1, retry_delay: DEFAULT_RETRY_DELAY }
    }

    pub fn connect(rpc_url: &str) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let provider = ProviderBuilder::new().connect_http(rpc_url.parse()?).erased();
        Ok(Self::new(provider))
    }

    /// Try each fetch up to `tries` times on transport failures. Missing blocks
    /// are never retried.
    pub fn with_retry(mut self, tries: u32, delay: Duration) -> Self {
        self.tries = tries.max(1);
        self.retry_delay = delay;
        self
    }

    async fn fetch(&self, block: BlockRef) -> Result<Sample, OracleError> {
        let tag = match block {
            BlockRef::Number(n) => BlockNumberOrTag::Number(n),
            BlockRef::Latest => BlockNumberOrTag::Latest,
        };
        let mut attempt = 1;
        loop {
            match self.provider.get_block_by_number(tag).await {
                Ok(Some(b)) => return Ok(Sample::new(b.header.number, b.header.timestamp)),
                Ok(None) => return Err(OracleError::NotFound { block }),
                Err(e) if attempt < self.tries => {
                    warn!(%block, attempt, error = %e, "RPC fetch failed, retrying");
                    attempt += 1;
                    sleep(self.retry_delay).await;
                }
                Err(e) => return Err(OracleError::transport(block, e)),
            }
        }
    }
}

#[async_trait]
impl BlockOracle for RpcOracle {
    async fn fetch_by_index(&self, index: u64) -> Result<Sample, OracleError> {
        self.fetch(BlockRef::Number(index)).await
    }

    async fn fetch_latest(&self) -> Result<Sample, OracleError> {
        self.fetch(BlockRef::Latest).await
    }
}
