//! Analytics error types
//!
//! Insufficient data, mismatched series and degenerate numerics are not
//! errors; they come back as absent or empty results. These variants cover
//! the edges that genuinely fail: unparsable input and source loading.

use thiserror::Error;

/// Errors raised while turning raw tracker data into analyzable series
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// Timestamp text could not be read as a date or date-time
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Millisecond timestamp outside the representable calendar range
    #[error("Timestamp out of range: {0}")]
    TimestampOutOfRange(i64),

    /// Metric name not recognised
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    /// Reading a source file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON source document was malformed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV source rows were malformed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type alias for analytics operations
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnalyticsError::InvalidTimestamp("yesterday-ish".to_string());
        assert_eq!(err.to_string(), "Invalid timestamp: yesterday-ish");

        let err = AnalyticsError::UnknownMetric("steps".to_string());
        assert_eq!(err.to_string(), "Unknown metric: steps");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: AnalyticsError = io_err.into();
        assert!(matches!(err, AnalyticsError::Io(_)));
    }
}
