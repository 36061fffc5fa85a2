use std::{num::ParseFloatError, path::PathBuf};
use thiserror::Error;
use depth_sims::DepthPairError;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Failed to open bounds table {0}")]
    OpenFile(PathBuf, #[source] std::io::Error),

    #[error("Failed to read line {line}")]
    ReadLine{line: usize, #[source] source: std::io::Error},

    #[error("Line {line}: expected {expected} columns, found {found}")]
    InvalidColumnCount{line: usize, expected: usize, found: usize},

    #[error("Line {line}: invalid depth pair key")]
    InvalidKey{line: usize, #[source] source: DepthPairError},

    #[error("Line {line}: depth columns '{depths}' do not match the key '{key}'")]
    KeyMismatch{line: usize, key: String, depths: String},

    #[error("Line {line}: failed to parse '{value}' as a confidence bound")]
    InvalidBound{line: usize, value: String, #[source] source: ParseFloatError},

    #[error("Line {line}: duplicate depth pair {key}")]
    DuplicateKey{line: usize, key: String},
}
