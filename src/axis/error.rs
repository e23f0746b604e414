//! Axis solver error types

use thiserror::Error;

/// Errors that can occur while solving an axis
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AxisError {
    /// Non-finite bounds or min greater than max
    #[error("Invalid axis range: [{min}, {max}]")]
    InvalidRange { min: f64, max: f64 },

    /// No catalogue entry fits the data
    #[error("No axis solution found for [{min}, {max}]: {reason}")]
    NoSolution { min: f64, max: f64, reason: String },
}

/// Result type alias for axis operations
pub type AxisResult<T> = Result<T, AxisError>;
