//! Error types for controller operations.

use hn_core::HnError;
use thiserror::Error;

/// Result type for controller operations.
pub type ControlResult<T> = Result<T, ControlError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a controller.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Persisted controller state has the wrong size.
    #[error("Controller state error: expected {expected} values, got {actual}")]
    StateSize { expected: usize, actual: usize },
}

impl From<ControlError> for HnError {
    fn from(err: ControlError) -> Self {
        HnError::InvalidArg {
            what: format!("controller: {}", err),
        }
    }
}
