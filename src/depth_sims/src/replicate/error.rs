use thiserror::Error;
use crate::DepthPair;

#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error("No replicate out of {replicates} passed the filter threshold ({filter}) for depth pair {pair}")]
    EmptyDistribution{pair: DepthPair, replicates: u32, filter: f64},
}
