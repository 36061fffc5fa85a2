use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("Failed to build the worker thread pool")]
    BuildThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Worker pool returned {received} results out of {expected} dispatched jobs. Missing keys: [{missing}]")]
    MissingResults{expected: usize, received: usize, missing: String},
}

/// Failure of a single job. Failures are reported under their key, and never reduce the result count.
#[derive(Debug, Error, PartialEq)]
pub enum JobError<E> {
    #[error("{0}")]
    Failed(E),

    #[error("Worker panicked while processing this job: {0}")]
    Panicked(String),

    #[error("Job was cancelled before being processed")]
    Cancelled,
}
