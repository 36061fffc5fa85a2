mod record_reader;
pub use record_reader::{
    RecordReader, Record, RecordTable, ParseError, FieldError,
    parse_depth, WT_COLUMN, MT_COLUMN, DEFAULT_AD_FIELD,
};
