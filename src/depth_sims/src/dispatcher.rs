use std::collections::{BTreeMap, BTreeSet};

use fastrand::Rng;
use log::{info, warn};
use logger::Logger;

use crate::{
    ConfidenceBounds, DepthPair, SimConfig,
    config::available_parallelism,
    pool::{CancelToken, JobError, ParallelMap, PoolError},
};

/// Fan out one simulation task per distinct depth pair, and fan the obtained confidence bounds back in.
pub struct Dispatcher {
    config: SimConfig,
    cancel: CancelToken,
}

impl Dispatcher {
    #[must_use]
    pub fn new(config: SimConfig) -> Self {
        Self { config, cancel: CancelToken::new() }
    }

    /// Allow an external caller to interrupt the run. Remaining depth pairs are assigned unsupported bounds.
    #[must_use]
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Simulate confidence bounds for every depth pair of `pairs`.
    /// 
    /// Each depth pair is simulated using its own random generator, seeded from the master seed and the depth
    /// pair itself (see [`task_seed`]). Results are thus reproducible, regardless of the number of workers.
    /// 
    /// Depth pairs that could not be simulated (no replicate passed the filter, worker panic, cancellation) are
    /// assigned [`ConfidenceBounds::unsupported`], and reported with a warning: the returned mapping always holds
    /// exactly one entry per input depth pair.
    /// 
    /// # Errors
    /// - if the underlying worker pool cannot be built, or fails to account for every dispatched depth pair.
    pub fn run_all(&self, pairs: &BTreeSet<DepthPair>) -> Result<BTreeMap<DepthPair, ConfidenceBounds>, PoolError> {
        let workers = self.config.working_threads(pairs.len());
        info!("Available CPUs: {} - Working CPUs: {workers}", available_parallelism());
        info!("Simulating {} depth pairs ({} replicates each)", pairs.len(), self.config.replicates());

        let progress  = Logger::progress_bar(pairs.len() as u64, "depth pairs");
        let simulator = self.config.simulator();
        let seed      = self.config.seed();

        let results = ParallelMap::new(workers)
            .with_cancel_token(self.cancel.clone())
            .with_progress(progress.clone())
            .run(pairs.iter().copied(), |pair| {
                let mut rng = Rng::with_seed(task_seed(seed, pair));
                simulator.simulate(*pair, &mut rng)
            })?;
        progress.finish_and_clear();

        let mut unsupported = 0;
        let bounds = results.into_iter().map(|(pair, result)| {
            let bounds = result.unwrap_or_else(|e| {
                match &e {
                    JobError::Failed(e)  => warn!("{e}. Bounds of this pair are set to NA"),
                    JobError::Panicked(_) | JobError::Cancelled => warn!("Failed to simulate depth pair {pair}: {e}"),
                }
                unsupported += 1;
                ConfidenceBounds::unsupported()
            });
            (pair, bounds)
        }).collect();

        if unsupported > 0 {
            warn!("{unsupported} depth pair(s) out of {} lack simulated support", pairs.len());
        }
        Ok(bounds)
    }
}

/// Derive the seed of a depth pair simulation from the master seed of the run.
#[must_use]
pub fn task_seed(master_seed: u64, pair: &DepthPair) -> u64 {
    let key = (u64::from(pair.depth_a().get()) << 32) | u64::from(pair.depth_b().get());
    splitmix64(master_seed ^ splitmix64(key))
}

// SplitMix64 finalizer (Steele, Lea & Flood 2014)
fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
