#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use date_to_block::{BlockOracle, BlockRef, OracleError, Sample};
use tokio::time::{sleep, Duration};

/// Replays samples in call order, then repeats `fallback` forever.
pub struct ScriptedOracle {
    script: Mutex<VecDeque<Sample>>,
    fallback: Option<Sample>,
    calls: Mutex<Vec<BlockRef>>,
}

impl ScriptedOracle {
    pub fn new(script: impl IntoIterator<Item = Sample>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            fallback: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_fallback(mut self, sample: Sample) -> Self {
        self.fallback = Some(sample);
        self
    }

    pub fn calls(&self) -> Vec<BlockRef> {
        self.calls.lock().unwrap().clone()
    }

    fn next(&self, block: BlockRef) -> Result<Sample, OracleError> {
        self.calls.lock().unwrap().push(block);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .or(self.fallback)
            .ok_or(OracleError::NotFound { block })
    }
}

#[async_trait]
impl BlockOracle for ScriptedOracle {
    async fn fetch_by_index(&self, index: u64) -> Result<Sample, OracleError> {
        self.next(BlockRef::Number(index))
    }

    async fn fetch_latest(&self) -> Result<Sample, OracleError> {
        self.next(BlockRef::Latest)
    }
}

/// Chain with a constant block time: `timestamp(i) = genesis_ts + (i - first) * block_time`.
pub struct LinearChain {
    pub first: u64,
    pub latest: u64,
    pub genesis_ts: u64,
    pub block_time: u64,
    fetches: AtomicU64,
}

impl LinearChain {
    pub fn new(first: u64, latest: u64, genesis_ts: u64, block_time: u64) -> Self {
        Self { first, latest, genesis_ts, block_time, fetches: AtomicU64::new(0) }
    }

    pub fn timestamp_of(&self, index: u64) -> u64 {
        self.genesis_ts + (index - self.first) * self.block_time
    }

    pub fn fetches(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }

    fn sample(&self, index: u64) -> Result<Sample, OracleError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if index < self.first || index > self.latest {
            return Err(OracleError::NotFound { block: BlockRef::Number(index) });
        }
        Ok(Sample::new(index, self.timestamp_of(index)))
    }
}

#[async_trait]
impl BlockOracle for LinearChain {
    async fn fetch_by_index(&self, index: u64) -> Result<Sample, OracleError> {
        self.sample(index)
    }

    async fn fetch_latest(&self) -> Result<Sample, OracleError> {
        self.sample(self.latest)
    }
}

pub enum Failure {
    Transport,
    NotFound,
}

/// Delegates to a [`LinearChain`] but fails the `fail_on`-th call (1-based).
pub struct FailingOracle {
    pub inner: LinearChain,
    fail_on: u64,
    failure: Failure,
    calls: AtomicU64,
}

impl FailingOracle {
    pub fn new(inner: LinearChain, fail_on: u64, failure: Failure) -> Self {
        Self { inner, fail_on, failure, calls: AtomicU64::new(0) }
    }

    fn check(&self, block: BlockRef) -> Result<(), OracleError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call != self.fail_on {
            return Ok(());
        }
        match self.failure {
            Failure::Transport => Err(OracleError::transport(
                block,
                std::io::Error::new(std::io::ErrorKind::TimedOut, "request timed out"),
            )),
            Failure::NotFound => Err(OracleError::NotFound { block }),
        }
    }
}

#[async_trait]
impl BlockOracle for FailingOracle {
    async fn fetch_by_index(&self, index: u64) -> Result<Sample, OracleError> {
        self.check(BlockRef::Number(index))?;
        self.inner.fetch_by_index(index).await
    }

    async fn fetch_latest(&self) -> Result<Sample, OracleError> {
        self.check(BlockRef::Latest)?;
        self.inner.fetch_latest().await
    }
}

/// Answers the bounding fetches at once and stalls every narrowing fetch.
pub struct StallingOracle {
    pub inner: LinearChain,
    pub stall: Duration,
    pub completed_narrowing: AtomicU64,
}

impl StallingOracle {
    pub fn new(inner: LinearChain, stall: Duration) -> Self {
        Self { inner, stall, completed_narrowing: AtomicU64::new(0) }
    }
}

#[async_trait]
impl BlockOracle for StallingOracle {
    async fn fetch_by_index(&self, index: u64) -> Result<Sample, OracleError> {
        if index == self.inner.first {
            return self.inner.fetch_by_index(index).await;
        }
        sleep(self.stall).await;
        let sample = self.inner.fetch_by_index(index).await?;
        self.completed_narrowing.fetch_add(1, Ordering::SeqCst);
        Ok(sample)
    }

    async fn fetch_latest(&self) -> Result<Sample, OracleError> {
        self.inner.fetch_latest().await
    }
}
