//! Shape engine error types
//!
//! These are contract errors: a schema authored incorrectly, or the engine
//! called out of order. Data-quality problems never surface here; they are
//! reported through [`Trace`](crate::Trace).

use thiserror::Error;

/// Result type for shape operations
pub type Result<T> = std::result::Result<T, ShapeError>;

/// Shape construction, optimization and validation contract errors
#[derive(Debug, Error)]
pub enum ShapeError {
    /// Two explicit labels disagree for the same field
    #[error("Conflicting labels for field {predicate}: '{existing}' vs '{proposed}'")]
    LabelConflict {
        predicate: String,
        existing: String,
        proposed: String,
    },

    /// Two different fields resolve to the same label
    #[error("Label '{label}' is claimed by two fields: {first} and {second}")]
    LabelCollision {
        label: String,
        first: String,
        second: String,
    },

    /// Conjunction of constraints with an empty required intersection
    #[error("Contradictory {constraint} constraints: {message}")]
    Contradiction {
        constraint: &'static str,
        message: String,
    },

    /// A guard reached the optimizer or validator without being redacted
    #[error("Unresolved guard on axis '{axis}': redact the shape before optimizing or validating")]
    UnresolvedGuard { axis: String },

    /// Invalid regex in a pattern or like constraint
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        pattern: String,
        message: String,
    },

    /// Invalid argument to a shape constructor
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ShapeError {
    /// Create a contradiction error
    pub fn contradiction(constraint: &'static str, message: impl Into<String>) -> Self {
        ShapeError::Contradiction {
            constraint,
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        ShapeError::InvalidArgument(msg.into())
    }
}
