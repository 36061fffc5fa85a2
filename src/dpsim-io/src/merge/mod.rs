use log::{debug, info};

use crate::{
    read::RecordTable,
    table::{BoundsRow, BoundsTable, MERGE_HEADER},
    write::WRITER_SEPARATOR,
};

/// Header used when the input records did not carry any.
pub const DEFAULT_RECORD_HEADER: &str = "#ID";

/// Records joined with their simulated confidence bounds.
/// # Fields:
/// - `header`  : input header, extended with [`MERGE_HEADER`]
/// - `lines`   : merged records, in input order.
/// - `unmatched`: line numbers of records lacking a depth pair, or whose depth pair is missing from the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRecords {
    pub header   : String,
    pub lines    : Vec<String>,
    pub unmatched: Vec<usize>,
}

impl MergedRecords {
    /// Header, followed by every merged line.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.header.as_str()).chain(self.lines.iter().map(String::as_str))
    }
}

/// Append simulated bounds to every record, using their normalized depth pair as a key.
/// 
/// Each merged line has the form `<record>  <DP_wt>  <DP_mt>  <p90L> <p90H> <p95L> <p95H> <p99L> <p99H>`, where
/// depths are normalized. Records lacking a key within `bounds` are left out of the output.
#[must_use]
pub fn merge_records(records: &RecordTable, bounds: &BoundsTable) -> MergedRecords {
    let header = format!("{}{WRITER_SEPARATOR}{}",
        records.header.as_deref().unwrap_or(DEFAULT_RECORD_HEADER),
        MERGE_HEADER.join(WRITER_SEPARATOR)
    );

    let mut lines     = Vec::with_capacity(records.records.len());
    let mut unmatched = Vec::new();
    for record in &records.records {
        let row = record.key.as_ref().and_then(|pair| bounds.get(pair).map(|bounds| BoundsRow{pair, bounds}));
        match row {
            Some(row) => lines.push(format!("{}{WRITER_SEPARATOR}{}", record.line, row.values())),
            None      => {
                debug!("Skipped record at line {}: no simulated bounds for depths {:?}", record.line_number, record.depths);
                unmatched.push(record.line_number);
            }
        }
    }

    info!("Merged {} records with their simulated bounds ({} skipped)", lines.len(), unmatched.len());
    MergedRecords { header, lines, unmatched }
}
