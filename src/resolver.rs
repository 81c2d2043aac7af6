use tracing::{debug, info, warn};

use crate::oracle::{BlockOracle, OracleError, Sample};

pub const DEFAULT_FIRST_INDEX: u64 = 1;
pub const DEFAULT_TOLERANCE_SECS: u64 = 3 * 60 * 60;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 35;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverSettings {
    /// Lowest index the oracle can serve.
    pub first_index: u64,
    pub tolerance_secs: u64,
    /// Budget for the narrowing phase. The two bounding fetches are free.
    pub max_attempts: u32,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            first_index: DEFAULT_FIRST_INDEX,
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionResult {
    pub sample: Sample,
    pub seconds_from_target: u64,
    pub attempts: u32,
}

impl ResolutionResult {
    fn new(sample: Sample, target: u64, attempts: u32) -> Self {
        Self {
            sample,
            seconds_from_target: sample.timestamp.abs_diff(target),
            attempts,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("Target timestamp {target} is in the future (latest block timestamp is {latest})")]
    FutureTarget { target: u64, latest: u64 },
    #[error("Exceeded max retries {max_attempts}. Last attempt at block {last_index}")]
    MaxRetriesExceeded { max_attempts: u32, last_index: u64 },
    #[error("Latest block {high} is below the first searchable block {low}")]
    InvalidRange { low: u64, high: u64 },
    #[error(transparent)]
    Oracle(#[from] OracleError),
}

#[derive(Debug, Clone, Default)]
pub struct BlockResolver {
    settings: ResolverSettings,
}

impl BlockResolver {
    pub fn new(settings: ResolverSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    pub async fn resolve<O>(&self, oracle: &O, target: u64) -> Result<ResolutionResult, ResolveError>
    where
        O: BlockOracle + ?Sized,
    {
        let first = oracle.fetch_by_index(self.settings.first_index).await?;
        let latest = oracle.fetch_latest().await?;

        if target > latest.timestamp {
            return Err(ResolveError::FutureTarget { target, latest: latest.timestamp });
        }
        if target < first.timestamp {
            debug!(target_ts = target, first = first.index, "target predates first block");
            return Ok(ResolutionResult::new(first, target, 0));
        }
        if latest.index < first.index {
            return Err(ResolveError::InvalidRange { low: first.index, high: latest.index });
        }

        let (mut low, mut high) = (first.index, latest.index);
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let mid = low + (high - low) / 2;
            let sample = oracle.fetch_by_index(mid).await?;
            let seconds_from_target = sample.timestamp.abs_diff(target);
            debug!(attempts, low, high, mid, timestamp = sample.timestamp, "narrowing");

            if seconds_from_target <= self.settings.tolerance_secs {
                info!(block = sample.index, attempts, seconds_from_target, "resolved");
                return Ok(ResolutionResult { sample, seconds_from_target, attempts });
            }
            if attempts >= self.settings.max_attempts {
                warn!(attempts, last_index = mid, "narrowing budget exhausted");
                return Err(ResolveError::MaxRetriesExceeded {
                    max_attempts: self.settings.max_attempts,
                    last_index: mid,
                });
            }

            // mid stays a bound: equal timestamps may repeat across indices.
            if sample.timestamp < target {
                low = mid;
            } else {
                high = mid;
            }
        }
    }
}
