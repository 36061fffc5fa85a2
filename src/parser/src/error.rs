use std::path::PathBuf;

use thiserror::Error;
use crate::FileEntity;

#[derive(Error, Debug)]
pub enum ParserError{
    #[error("{0} {1} does not exist")]
    MissingFileEntity(FileEntity, String),

    #[error("{1} is not a {0}")]
    InvalidFileEntity(FileEntity, String),

    #[error("Failed to generate an output file prefix from {0}. Note that file prefixes are generated from the input filestem")]
    ParseOutputPrefix(PathBuf),

    #[error("{0} already exists. Use --overwrite to force.")]
    CannotOverwrite(String),

    #[error("Failed to serialize command line arguments")]
    Serialize(#[source] serde_yaml::Error),

    #[error("Unable to deserialize arguments from {0}")]
    Deserialize(PathBuf, #[source] serde_yaml::Error),

    #[error("Failed to access {0}")]
    Io(PathBuf, #[source] std::io::Error),
}
