use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    UnsupportedType(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Extraction failed: {0}")]
    Extraction(String),
}

pub type Result<T> = std::result::Result<T, Error>;
