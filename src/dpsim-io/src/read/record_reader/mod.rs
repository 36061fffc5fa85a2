use std::{
    collections::BTreeSet,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use depth_sims::DepthPair;
use located_error::prelude::*;
use log::{debug, info};

mod error;
pub use error::{FieldError, ParseError};

/// 0-based column of the wild-type bulk genotype field.
pub const WT_COLUMN: usize = 3;
/// 0-based column of the mutant bulk genotype field.
pub const MT_COLUMN: usize = 4;
/// 0-based index of the allelic depth sub-field within a ':'-separated genotype field.
pub const DEFAULT_AD_FIELD: usize = 2;

const MISSING_VALUE  : &str = ".";
const FIELD_SEP      : char = ':';
const ALLELE_SEP     : char = ',';
const HEADER_PREFIX  : char = '#';

/// A single input record, along with its normalized depth pair key.
/// # Fields:
/// - `line_number`: 1-based line number within the source file.
/// - `line`       : raw, untouched line.
/// - `depths`     : raw (wild-type, mutant) depths, before normalization.
/// - `key`        : normalized depth pair. `None` if both depths are null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub line_number: usize,
    pub line       : String,
    pub depths     : (u32, u32),
    pub key        : Option<DepthPair>,
}

/// Parsed contents of a records file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordTable {
    pub header : Option<String>,
    pub records: Vec<Record>,
}

impl RecordTable {
    /// Deduplicated and sorted set of depth pairs requiring simulation.
    #[must_use]
    pub fn depth_pairs(&self) -> BTreeSet<DepthPair> {
        self.records.iter().filter_map(|record| record.key).collect()
    }

    /// Number of records lacking any depth information.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.records.iter().filter(|record| record.key.is_none()).count()
    }
}

/// Extract the total read depth (`ref + alt`) out of a ':'-separated genotype field.
/// 
/// A missing genotype ('.'), or a missing allelic depth sub-field value ('.') is considered as a null depth.
/// 
/// # Errors
/// - if the genotype field has less than `ad_field + 1` sub-fields.
/// - if the allelic depth sub-field does not hold at least a ref and an alt count.
/// - if any of these counts is not a valid unsigned integer.
pub fn parse_depth(field: &str, ad_field: usize) -> Result<u32, FieldError> {
    use FieldError::{MissingSubField, MissingAltDepth, InvalidCount, Overflow};
    if field == MISSING_VALUE {
        return Ok(0)
    }

    let allelic_depth = field.split(FIELD_SEP).nth(ad_field)
        .ok_or_else(|| MissingSubField{field: field.to_string(), index: ad_field})?;

    if allelic_depth == MISSING_VALUE {
        return Ok(0)
    }

    let mut counts = allelic_depth.split(ALLELE_SEP).map(|count| {
        count.parse::<u32>().map_err(|source| InvalidCount{value: count.to_string(), source})
    });

    let reference = counts.next().ok_or_else(|| MissingAltDepth(allelic_depth.to_string()))??;
    let alternate = counts.next().ok_or_else(|| MissingAltDepth(allelic_depth.to_string()))??;
    reference.checked_add(alternate).ok_or_else(|| Overflow(allelic_depth.to_string()))
}

/// Whitespace-separated records reader.
/// 
/// Lines starting with '#' are considered as headers. Only the first header line is kept: the rest are ignored.
/// Every other line must hold the wild-type and mutant genotype fields at columns [`WT_COLUMN`] and [`MT_COLUMN`].
pub struct RecordReader<'a> {
    source  : Box<dyn BufRead + 'a>,
    ad_field: usize,
}

impl<'a> RecordReader<'a> {
    /// Open a records file.
    /// 
    /// # Errors
    /// - if `path` targets an invalid location (`FileNotFound` or `PermissionDenied`)
    pub fn new(path: &Path, ad_field: usize) -> Result<RecordReader<'a>> {
        File::open(path)
            .map(|file| Self::from_reader(BufReader::new(file), ad_field))
            .map_err(|e| ParseError::OpenFile(path.to_path_buf(), e))
            .loc("While attempting to create a new RecordReader")
    }

    pub fn from_reader(reader: impl BufRead + 'a, ad_field: usize) -> Self {
        Self { source: Box::new(reader), ad_field }
    }

    /// Parse a single record line.
    fn parse_record(line: String, line_number: usize, ad_field: usize) -> Result<Record, ParseError> {
        use ParseError::{MissingColumn, InvalidField};
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() <= MT_COLUMN {
            return Err(MissingColumn{line: line_number, expected: MT_COLUMN + 1, found: fields.len()})
        }

        let depth = |column: usize| parse_depth(fields[column], ad_field)
            .map_err(|source| InvalidField{line: line_number, column, source});

        let depths = (depth(WT_COLUMN)?, depth(MT_COLUMN)?);
        let key    = DepthPair::normalize(depths.0, depths.1);
        if key.is_none() {
            info!("Skip depth: line {line_number} has a null depth in both bulks");
        }
        Ok(Record { line_number, line, depths, key })
    }

    /// Read every record of the source.
    /// 
    /// # Errors
    /// - if a line cannot be read.
    /// - if a record is missing one of its genotype columns, or holds an invalid genotype field.
    pub fn read_records(self) -> Result<RecordTable> {
        let Self { source, ad_field } = self;
        let mut table = RecordTable::default();
        for (i, line) in source.lines().enumerate() {
            let line_number = i + 1;
            let line = line.map_err(|source| ParseError::ReadLine{line: line_number, source})
                .loc("While reading records")?;

            if line.trim().is_empty() {
                continue
            }

            if line.starts_with(HEADER_PREFIX) {
                match table.header {
                    None    => table.header = Some(line),
                    Some(_) => debug!("Ignoring additional header line {line_number}"),
                }
                continue
            }

            let record = Self::parse_record(line, line_number, ad_field).loc("While parsing records")?;
            table.records.push(record);
        }

        info!("Total number of depth pairs: {} ({} records, {} skipped)",
            table.depth_pairs().len(), table.records.len(), table.skipped()
        );
        Ok(table)
    }
}
