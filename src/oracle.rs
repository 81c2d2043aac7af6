use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// One `(index, timestamp)` observation taken from an oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sample {
    pub index: u64,
    pub timestamp: u64,
}

impl Sample {
    pub fn new(index: u64, timestamp: u64) -> Self {
        Self { index, timestamp }
    }

    /// UTC date of the sample, `None` if chrono cannot represent the timestamp.
    pub fn date(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.timestamp).ok()?;
        DateTime::from_timestamp(secs, 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRef {
    Number(u64),
    Latest,
}

impl fmt::Display for BlockRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockRef::Number(n) => write!(f, "{}", n),
            BlockRef::Latest => f.write_str("latest"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("transport error fetching block {block}: {source}")]
    Transport {
        block: BlockRef,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("block {block} not found")]
    NotFound { block: BlockRef },
}

impl OracleError {
    pub fn transport<E>(block: BlockRef, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        OracleError::Transport { block, source: source.into() }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, OracleError::Transport { .. })
    }
}

/// Timestamped samples over a non-decreasing index range.
#[async_trait]
pub trait BlockOracle: Send + Sync {
    async fn fetch_by_index(&self, index: u64) -> Result<Sample, OracleError>;

    async fn fetch_latest(&self) -> Result<Sample, OracleError>;
}

#[async_trait]
impl<T: BlockOracle + ?Sized> BlockOracle for Arc<T> {
    async fn fetch_by_index(&self, index: u64) -> Result<Sample, OracleError> {
        (**self).fetch_by_index(index).await
    }

    async fn fetch_latest(&self) -> Result<Sample, OracleError> {
        (**self).fetch_latest().await
    }
}

#[async_trait]
impl<'a, T: BlockOracle + ?Sized> BlockOracle for &'a T {
    async fn fetch_by_index(&self, index: u64) -> Result<Sample, OracleError> {
        (**self).fetch_by_index(index).await
    }

    async fn fetch_latest(&self) -> Result<Sample, OracleError> {
        (**self).fetch_latest().await
    }
}
