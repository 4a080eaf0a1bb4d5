use thiserror::Error;

#[derive(Error, Debug)]
pub enum TechSignalError {
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Data loading error: {0}")]
    DataLoading(String),

    #[error("Missing required column: {column}")]
    MissingColumn { column: String },

    #[error("Indicator error: {0}")]
    IndicatorError(String),

    #[error("Computation error: {0}")]
    Computation(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Chart error: {0}")]
    Chart(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, TechSignalError>;
