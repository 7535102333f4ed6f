//! Error taxonomy for the EMI simulation engine.
//!
//! The engine is a pure computation core: once a configuration has been
//! validated, every operation is total. The only failure class is therefore
//! a precondition violation at configuration or invocation time, and those
//! must fail fast with a descriptive condition instead of degrading
//! silently (a zero bit rate must never become an infinite bit duration).

/// Result type for fallible engine operations.
pub type EmcResult<T> = Result<T, EmcError>;

/// Precondition violations raised at configuration or invocation time.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EmcError {
    #[error("invalid {quantity} range: min {min} is greater than max {max}")]
    InvalidRange {
        quantity: &'static str,
        min: f64,
        max: f64,
    },

    #[error("bit rate must be positive, got {0}")]
    NonPositiveBitRate(f64),

    #[error("frame payload is empty")]
    EmptyFrame,

    #[error("unknown interference source: {0}")]
    UnknownSource(String),

    #[error("sweep amplitude levels must be non-empty and strictly ascending")]
    InvalidSweepLevels,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EmcError::InvalidRange {
            quantity: "frequency",
            min: 2.0,
            max: 1.0,
        };
        assert!(err.to_string().contains("frequency"));
        assert!(err.to_string().contains("greater than"));

        let err = EmcError::NonPositiveBitRate(0.0);
        assert!(err.to_string().contains("positive"));

        let err = EmcError::UnknownSource("Arc Welder".to_string());
        assert!(err.to_string().contains("Arc Welder"));
    }
}
