use std::num::ParseIntError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DepthPairError {
    #[error("Invalid depth pair key '{0}': expected '<depthA>_<depthB>'")]
    MissingSeparator(String),

    #[error("Invalid depth pair key '{key}': failed to parse '{value}' as a depth")]
    InvalidDepth{key: String, value: String, #[source] source: ParseIntError},

    #[error("Invalid depth pair key '{0}': simulated depths must be strictly positive")]
    NullDepth(String),
}
