//! Depth-conditioned segregation simulations.
//!
//! Given a pair of bulk sequencing depths, simulate the null distribution of the delta SNP-index between two
//! bulks sampled from the same segregating population, and summarize it through two-sided 90/95/99% bounds.
//! Simulations of independent depth pairs are fanned out across a bounded worker pool.

pub mod depth_pair;
pub mod genotype;
pub mod index;
pub mod bounds;
pub mod replicate;
pub mod config;
pub mod pool;
pub mod dispatcher;

pub use depth_pair::{DepthPair, DepthPairError};
pub use bounds::{ConfidenceBounds, IntervalWidth};
pub use replicate::{Replicate, ReplicateSimulator, SimulationError};
pub use config::{SimConfig, SimConfigBuilder, ConfigError};
pub use pool::{ParallelMap, CancelToken, JobError, PoolError};
pub use dispatcher::Dispatcher;
pub use parser::PopulationModel;

use std::collections::{BTreeMap, BTreeSet};

/// Simulate confidence bounds for every provided depth pair, using a fully validated configuration.
/// 
/// Convenience wrapper around [`Dispatcher::run_all`]. The returned mapping holds exactly one entry per
/// input depth pair.
pub fn run_all(pairs: &BTreeSet<DepthPair>, config: SimConfig) -> Result<BTreeMap<DepthPair, ConfidenceBounds>, PoolError> {
    Dispatcher::new(config).run_all(pairs)
}
