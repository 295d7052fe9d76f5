//! Error types for the normalization engine.
//!
//! Only structural defects surface as errors. Missing or malformed upstream
//! data is modelled as absence (`Option`) and never reaches this enum.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StatsError {
    /// Invalid metric table or runtime configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Output schema missing, unreadable, or malformed.
    #[error("output schema error: {0}")]
    Schema(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, StatsError>;
