use std::{
    collections::BTreeMap,
    fmt::{self, Display, Formatter},
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use ahash::AHashMap;
use depth_sims::{ConfidenceBounds, DepthPair};
use located_error::prelude::*;
use log::debug;

use crate::write::{GenericWriter, WRITER_SEPARATOR};

mod error;
pub use error::TableError;

/// Column names of a bounds table.
pub const TABLE_HEADER: [&str; 9] = ["#ID", "DP_wt", "DP_mt", "p90L", "p90H", "p95L", "p95H", "p99L", "p99H"];

/// Column names appended to the header of merged records.
pub const MERGE_HEADER: [&str; 8] = ["dp_WT", "dp_MT", "p90L", "p90H", "p95L", "p95H", "p99L", "p99H"];

/// Value written in place of unsupported bounds.
pub const MISSING_BOUND: &str = "NA";

/// A single row of a bounds table: `<a>_<b>  <a>  <b>  <p90L> <p90H> <p95L> <p95H> <p99L> <p99H>`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsRow<'a> {
    pub pair  : &'a DepthPair,
    pub bounds: &'a ConfidenceBounds,
}

impl<'a> BoundsRow<'a> {
    /// Row values, without the leading `#ID` key: `<a>  <b>  <bounds>`
    #[must_use]
    pub fn values(&self) -> String {
        format!("{}{WRITER_SEPARATOR}{}{WRITER_SEPARATOR}{}", self.pair.depth_a(), self.pair.depth_b(), self.bounds)
    }
}

impl Display for BoundsRow<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}{WRITER_SEPARATOR}{}", self.pair, self.values())
    }
}

/// Simulated confidence bounds, indexed by depth pair.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BoundsTable {
    inner: AHashMap<DepthPair, ConfidenceBounds>,
}

impl From<BTreeMap<DepthPair, ConfidenceBounds>> for BoundsTable {
    fn from(bounds: BTreeMap<DepthPair, ConfidenceBounds>) -> Self {
        Self { inner: bounds.into_iter().collect() }
    }
}

impl BoundsTable {
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[must_use]
    pub fn get(&self, pair: &DepthPair) -> Option<&ConfidenceBounds> {
        self.inner.get(pair)
    }

    /// Number of depth pairs lacking simulated support.
    #[must_use]
    pub fn unsupported(&self) -> usize {
        self.inner.values().filter(|bounds| !bounds.is_supported()).count()
    }

    /// Rows of this table, sorted by depth pair.
    #[must_use]
    pub fn rows(&self) -> Vec<BoundsRow<'_>> {
        let mut rows: Vec<BoundsRow> = self.inner.iter().map(|(pair, bounds)| BoundsRow{pair, bounds}).collect();
        rows.sort_unstable_by_key(|row| row.pair);
        rows
    }

    /// Write this table into `path`, or stdout if `None`
    /// 
    /// # Errors
    /// - if the file cannot be created, or written.
    pub fn write(&self, path: Option<&Path>) -> Result<()> {
        let mut writer = GenericWriter::new(path)?;
        writer.write_iter([TABLE_HEADER.join(WRITER_SEPARATOR)])?;
        writer.write_iter(self.rows())
    }

    /// Read a bounds table previously written with [`BoundsTable::write`].
    /// 
    /// # Errors
    /// - if `path` cannot be opened or read.
    /// - if any row is malformed. (see [`TableError`])
    pub fn read(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .map_err(|e| TableError::OpenFile(path.to_path_buf(), e))
            .loc("While reading bounds table")?;
        Self::from_reader(BufReader::new(file)).with_loc(|| format!("While reading bounds table {}", path.display()))
    }

    /// Parse a bounds table out of any buffered reader. Lines starting with '#' are ignored.
    /// 
    /// # Errors
    /// - if a line cannot be read, or any row is malformed.
    pub fn from_reader(reader: impl BufRead) -> Result<Self, TableError> {
        let mut table = Self::default();
        for (i, line) in reader.lines().enumerate() {
            let line_number = i + 1;
            let line = line.map_err(|source| TableError::ReadLine{line: line_number, source})?;
            if line.starts_with('#') || line.trim().is_empty() {
                continue
            }
            let (pair, bounds) = Self::parse_row(&line, line_number)?;
            if table.inner.insert(pair, bounds).is_some() {
                return Err(TableError::DuplicateKey{line: line_number, key: pair.to_string()})
            }
        }
        debug!("Parsed {} depth pairs from bounds table", table.len());
        Ok(table)
    }

    fn parse_row(line: &str, line_number: usize) -> Result<(DepthPair, ConfidenceBounds), TableError> {
        use TableError::{InvalidColumnCount, InvalidKey, KeyMismatch, InvalidBound};
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != TABLE_HEADER.len() {
            return Err(InvalidColumnCount{line: line_number, expected: TABLE_HEADER.len(), found: fields.len()})
        }

        let pair: DepthPair = fields[0].parse().map_err(|source| InvalidKey{line: line_number, source})?;
        if fields[1] != pair.depth_a().to_string() || fields[2] != pair.depth_b().to_string() {
            return Err(KeyMismatch{line: line_number, key: fields[0].to_string(), depths: fields[1..3].join(" ")})
        }

        let mut values = [f64::NAN; ConfidenceBounds::LEN];
        for (value, field) in values.iter_mut().zip(&fields[3..]) {
            if *field != MISSING_BOUND {
                *value = field.parse().map_err(|source| InvalidBound{line: line_number, value: (*field).to_string(), source})?;
            }
        }
        Ok((pair, ConfidenceBounds::from_values(values)))
    }
}
