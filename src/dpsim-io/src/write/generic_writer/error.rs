use thiserror::Error;

#[derive(Error, Debug)]
pub enum WriterError {
    #[error("Failed to create output file {0}")]
    CreateFile(String, #[source] std::io::Error),

    #[error("Failed to write to file: inner writer returned an io error")]
    IOError(#[from] std::io::Error),
}
