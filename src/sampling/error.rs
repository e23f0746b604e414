//! Sampling error types
//!
//! Defines all errors that can occur while fetching a sample.

use thiserror::Error;

/// Errors that can occur while sampling a feature
#[derive(Error, Debug)]
pub enum SamplingError {
    /// A window argument was zero, negative, or otherwise unusable
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The data source failed to answer
    #[error("Data source error: {0}")]
    Source(String),

    /// CSV input could not be read
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for sampling operations
pub type SamplingResult<T> = Result<T, SamplingError>;
