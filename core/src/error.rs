use thiserror::Error;

pub type Result<T> = std::result::Result<T, FaqError>;

#[derive(Debug, Error)]
pub enum FaqError {
    /// Ingest input rejected before any stored state was touched.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("topic not found: {0}")]
    NotFound(String),

    /// The lemmatization capability failed or is misconfigured.
    #[error("lemmatizer error: {0}")]
    Lemmatizer(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<sled::Error> for FaqError {
    fn from(err: sled::Error) -> Self {
        FaqError::Storage(err.to_string())
    }
}

impl From<bincode::Error> for FaqError {
    fn from(err: bincode::Error) -> Self {
        FaqError::Storage(err.to_string())
    }
}
