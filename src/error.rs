use std::fmt;

/// Result type for minidqn operations
pub type Result<T> = std::result::Result<T, DqnError>;

/// Main error type for the agent, its replay memory and the default approximator
#[derive(Debug, Clone, PartialEq)]
pub enum DqnError {
    /// Array shapes do not line up
    DimensionMismatch {
        expected: String,
        actual: String,
    },

    /// Invalid configuration or argument value
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// Action is not part of the enabled action set
    UnknownAction(String),

    /// Sampling or training from an empty replay buffer
    EmptyBuffer(String),

    /// Loss or predictions are no longer finite
    NumericalError(String),

    /// IO errors (model artifacts, config files)
    IoError(String),

    /// Serialization/deserialization errors
    SerializationError(String),
}

impl fmt::Display for DqnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DqnError::DimensionMismatch { expected, actual } => {
                write!(f, "Dimension mismatch: expected {}, got {}", expected, actual)
            }
            DqnError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter '{}': {}", name, reason)
            }
            DqnError::UnknownAction(action) => {
                write!(f, "Unknown action {}: not in the enabled action set", action)
            }
            DqnError::EmptyBuffer(msg) => write!(f, "Empty buffer: {}", msg),
            DqnError::NumericalError(msg) => write!(f, "Numerical error: {}", msg),
            DqnError::IoError(msg) => write!(f, "IO error: {}", msg),
            DqnError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for DqnError {}

impl From<std::io::Error> for DqnError {
    fn from(err: std::io::Error) -> Self {
        DqnError::IoError(err.to_string())
    }
}

impl From<bincode::Error> for DqnError {
    fn from(err: bincode::Error) -> Self {
        DqnError::SerializationError(err.to_string())
    }
}

impl From<serde_json::Error> for DqnError {
    fn from(err: serde_json::Error) -> Self {
        DqnError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for DqnError {
    fn from(err: ndarray::ShapeError) -> Self {
        DqnError::DimensionMismatch {
            expected: "states of one common shape".to_string(),
            actual: err.to_string(),
        }
    }
}

// Helper functions for common error patterns
impl DqnError {
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        DqnError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        DqnError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
