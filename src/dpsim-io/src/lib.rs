pub mod read;
pub mod table;
pub mod write;
pub mod merge;
