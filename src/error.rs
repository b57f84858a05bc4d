//! Error types for the gender detector

use thiserror::Error;

/// Result type alias for detector operations
pub type Result<T> = std::result::Result<T, DetectorError>;

/// Main error type for the gender detector
#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DetectorError::DataError("test error".to_string());
        assert_eq!(err.to_string(), "Data error: test error");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: DetectorError = io_err.into();
        assert!(matches!(err, DetectorError::IoError(_)));
    }

    #[test]
    fn test_shape_error_display() {
        let err = DetectorError::ShapeError {
            expected: "10 labels".to_string(),
            actual: "8 labels".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid shape: expected 10 labels, got 8 labels");
    }
}
