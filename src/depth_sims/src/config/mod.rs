use std::num::{NonZeroU32, NonZeroUsize};

use parser::PopulationModel;

use crate::ReplicateSimulator;

mod error;
pub use error::ConfigError;

pub const DEFAULT_FILTER : f64   = 0.3;
pub const DEFAULT_THREADS: usize = 1;

/// Validated, immutable simulation parameters, shared by every simulation task of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    model     : PopulationModel,
    pool_size : NonZeroU32,
    replicates: NonZeroU32,
    filter    : f64,
    threads   : NonZeroUsize,
    seed      : u64,
}

impl SimConfig {
    #[must_use]
    pub fn builder() -> SimConfigBuilder {
        SimConfigBuilder::new()
    }

    #[must_use]
    pub fn model(&self) -> PopulationModel {
        self.model
    }

    #[must_use]
    pub fn pool_size(&self) -> NonZeroU32 {
        self.pool_size
    }

    #[must_use]
    pub fn replicates(&self) -> NonZeroU32 {
        self.replicates
    }

    #[must_use]
    pub fn filter(&self) -> f64 {
        self.filter
    }

    /// Requested number of worker threads. See [`SimConfig::working_threads`] for the effective value.
    #[must_use]
    pub fn threads(&self) -> NonZeroUsize {
        self.threads
    }

    /// Master seed, from which the seed of every depth pair simulation is derived.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn simulator(&self) -> ReplicateSimulator {
        ReplicateSimulator::new(self.model, self.pool_size, self.replicates, self.filter)
    }

    /// Effective number of workers: `min(requested, available parallelism, n_jobs)`, and at least one.
    #[must_use]
    pub fn working_threads(&self, n_jobs: usize) -> usize {
        self.threads.get()
            .min(available_parallelism())
            .min(n_jobs)
            .max(1)
    }
}

/// Number of CPUs available to this process. Falls back to one if this cannot be queried.
#[must_use]
pub fn available_parallelism() -> usize {
    std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
}

/// Incremental builder of a [`SimConfig`]. Validation is deferred to [`SimConfigBuilder::build`].
#[derive(Debug, Clone)]
pub struct SimConfigBuilder {
    model     : Option<PopulationModel>,
    pool_size : Option<u32>,
    replicates: Option<u32>,
    filter    : f64,
    threads   : usize,
    seed      : Option<u64>,
}

impl Default for SimConfigBuilder {
    fn default() -> Self {
        Self {
            model     : None,
            pool_size : None,
            replicates: None,
            filter    : DEFAULT_FILTER,
            threads   : DEFAULT_THREADS,
            seed      : None,
        }
    }
}

impl SimConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model(&mut self, model: PopulationModel) -> &mut Self {
        self.model = Some(model);
        self
    }

    pub fn pool_size(&mut self, pool_size: u32) -> &mut Self {
        self.pool_size = Some(pool_size);
        self
    }

    pub fn replicates(&mut self, replicates: u32) -> &mut Self {
        self.replicates = Some(replicates);
        self
    }

    pub fn filter(&mut self, filter: f64) -> &mut Self {
        self.filter = filter;
        self
    }

    pub fn threads(&mut self, threads: usize) -> &mut Self {
        self.threads = threads;
        self
    }

    pub fn seed(&mut self, seed: u64) -> &mut Self {
        self.seed = Some(seed);
        self
    }

    /// Validate parameters and build a `SimConfig`. A random master seed is drawn if none was provided.
    /// 
    /// # Errors
    /// - if the population model, pool size or replicate count is missing.
    /// - if the pool size, replicate count or thread count is zero.
    /// - if the filter threshold lies outside of `[0, 1]` (or is `NaN`).
    pub fn build(&self) -> Result<SimConfig, ConfigError> {
        use ConfigError::*;
        let model      = self.model.ok_or(MissingPopulationModel)?;
        let pool_size  = NonZeroU32::new(self.pool_size.ok_or(MissingPoolSize)?).ok_or(NullPoolSize)?;
        let replicates = NonZeroU32::new(self.replicates.ok_or(MissingReplicates)?).ok_or(NullReplicates)?;
        let threads    = NonZeroUsize::new(self.threads).ok_or(NullThreads)?;

        if !(0.0..=1.0).contains(&self.filter) {
            return Err(InvalidFilter(self.filter))
        }

        let seed = self.seed.unwrap_or_else(|| fastrand::u64(..));
        Ok(SimConfig { model, pool_size, replicates, filter: self.filter, threads, seed })
    }
}

impl TryFrom<&parser::Simulate> for SimConfig {
    type Error = ConfigError;

    fn try_from(args: &parser::Simulate) -> Result<Self, Self::Error> {
        SimConfig::builder()
            .model(args.pop)
            .pool_size(args.pool_size)
            .replicates(args.reps)
            .filter(args.filter)
            .threads(args.threads)
            .seed(args.seed)
            .build()
    }
}
