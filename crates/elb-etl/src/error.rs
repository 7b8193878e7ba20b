//! ETL driver error types.

use thiserror::Error;

/// Errors that can occur while loading logs.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("object not found: {0}")]
    NotFound(String),

    #[error("decode error in {key}: {message}")]
    Decode { key: String, message: String },

    #[error("database error: {0}")]
    Database(String),

    #[error("{0}")]
    Other(String),
}

impl From<sqlx::Error> for EtlError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(e.to_string())
    }
}

/// Convenience alias for ETL results.
pub type EtlResult<T> = Result<T, EtlError>;
