use std::num::NonZeroU32;

use fastrand::Rng;
use log::trace;
use parser::PopulationModel;

use crate::{
    DepthPair, ConfidenceBounds,
    genotype::sample_genotype_ratio,
    index::sample_index,
};

mod error;
pub use error::SimulationError;

/// A single simulated replicate of a depth pair. This is never persisted.
/// # Fields:
/// - `ratio_a`, `ratio_b`: simulated pooled allele ratio of each bulk.
/// - `index_a`, `index_b`: simulated observed SNP-index of each bulk, conditioned on its depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Replicate {
    pub ratio_a: f64,
    pub ratio_b: f64,
    pub index_a: f64,
    pub index_b: f64,
}

impl Replicate {
    #[must_use]
    pub fn delta(&self) -> f64 {
        self.index_a - self.index_b
    }

    /// A replicate is informative if at least one of its bulks reaches `threshold`.
    #[must_use]
    pub fn passes_filter(&self, threshold: f64) -> bool {
        self.index_a >= threshold || self.index_b >= threshold
    }
}

/// Simulate the null delta SNP-index distribution of a depth pair, and reduce it to confidence bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplicateSimulator {
    model     : PopulationModel,
    pool_size : NonZeroU32,
    replicates: NonZeroU32,
    filter    : f64,
}

impl ReplicateSimulator {
    /// # Arguments:
    /// - `model`     : population structure of the segregating population.
    /// - `pool_size` : number of individuals within each bulk.
    /// - `replicates`: number of replicates drawn per depth pair.
    /// - `filter`    : minimal SNP-index at least one bulk must reach for a replicate to be kept.
    #[must_use]
    pub fn new(model: PopulationModel, pool_size: NonZeroU32, replicates: NonZeroU32, filter: f64) -> Self {
        Self { model, pool_size, replicates, filter }
    }

    #[must_use]
    pub fn replicates(&self) -> u32 {
        self.replicates.get()
    }

    /// Draw a single replicate. Draw order: ratio_a, index_a, ratio_b, index_b.
    pub fn draw(&self, pair: DepthPair, rng: &mut Rng) -> Replicate {
        let ratio_a = sample_genotype_ratio(self.model, self.pool_size, rng);
        let index_a = sample_index(pair.depth_a(), ratio_a, rng);
        let ratio_b = sample_genotype_ratio(self.model, self.pool_size, rng);
        let index_b = sample_index(pair.depth_b(), ratio_b, rng);
        Replicate { ratio_a, ratio_b, index_a, index_b }
    }

    /// Draw `self.replicates` replicates, and return the ascending-sorted deltas of those passing the filter.
    pub fn simulate_deltas(&self, pair: DepthPair, rng: &mut Rng) -> Vec<f64> {
        let mut deltas: Vec<f64> = (0..self.replicates.get())
            .map(|_| self.draw(pair, rng))
            .filter(|replicate| replicate.passes_filter(self.filter))
            .map(|replicate| replicate.delta())
            .collect();
        deltas.sort_unstable_by(f64::total_cmp);
        deltas
    }

    /// Simulate the delta SNP-index distribution of `pair` and compute its confidence bounds.
    /// 
    /// # Errors
    /// - `SimulationError::EmptyDistribution` if no replicate passed the filter.
    pub fn simulate(&self, pair: DepthPair, rng: &mut Rng) -> Result<ConfidenceBounds, SimulationError> {
        let deltas = self.simulate_deltas(pair, rng);
        trace!("{pair}: {} replicates out of {} passed the filter", deltas.len(), self.replicates);

        ConfidenceBounds::from_sorted(&deltas).ok_or(SimulationError::EmptyDistribution {
            pair,
            replicates: self.replicates.get(),
            filter    : self.filter,
        })
    }
}
