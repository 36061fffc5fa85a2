use std::{num::ParseIntError, path::PathBuf};
use thiserror::Error;

/// Failure to extract a depth out of a single genotype field.
#[derive(Debug, Error, PartialEq)]
pub enum FieldError {
    #[error("genotype field '{field}' has no sub-field at index {index}")]
    MissingSubField{field: String, index: usize},

    #[error("allelic depth '{0}' is not in the form '<ref>,<alt>'")]
    MissingAltDepth(String),

    #[error("failed to parse '{value}' as a read count")]
    InvalidCount{value: String, #[source] source: ParseIntError},

    #[error("allelic depth '{0}' overflows")]
    Overflow(String),
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to open records file {0}")]
    OpenFile(PathBuf, #[source] std::io::Error),

    #[error("Failed to read line {line}")]
    ReadLine{line: usize, #[source] source: std::io::Error},

    #[error("Line {line}: expected at least {expected} columns, found {found}")]
    MissingColumn{line: usize, expected: usize, found: usize},

    #[error("Line {line}, column {column}: invalid genotype field")]
    InvalidField{line: usize, column: usize, #[source] source: FieldError},
}
