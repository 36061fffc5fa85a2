use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing population model. Please provide one of RIL or F2")]
    MissingPopulationModel,

    #[error("Missing pool size")]
    MissingPoolSize,

    #[error("Missing replicate count")]
    MissingReplicates,

    #[error("Pool size must be a strictly positive integer")]
    NullPoolSize,

    #[error("Replicate count must be a strictly positive integer")]
    NullReplicates,

    #[error("Invalid filter threshold ({0}). Value must lie within [0, 1]")]
    InvalidFilter(f64),

    #[error("The number of worker threads must be a strictly positive integer")]
    NullThreads,
}
