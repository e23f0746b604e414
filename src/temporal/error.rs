//! Temporal error types

use thiserror::Error;

/// Errors raised when building or parsing temporal amounts
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemporalError {
    /// Zero or negative duration/period
    #[error("Temporal amount must be positive: {0}")]
    NonPositiveAmount(String),

    /// Amount string could not be parsed
    #[error("Cannot parse temporal amount: {0}")]
    Parse(String),

    /// Weekday name could not be parsed
    #[error("Invalid weekday: {0}")]
    InvalidWeekday(String),
}

/// Result type alias for temporal operations
pub type TemporalResult<T> = Result<T, TemporalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TemporalError::NonPositiveAmount("0s".to_string());
        assert_eq!(err.to_string(), "Temporal amount must be positive: 0s");

        let err = TemporalError::Parse("3x".to_string());
        assert_eq!(err.to_string(), "Cannot parse temporal amount: 3x");
    }
}
