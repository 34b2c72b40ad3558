//! Error types for flow element operations.

use hn_controls::ControlError;
use hn_core::HnError;
use hn_fluids::FluidError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComponentError {
    #[error("Invalid parameter {what}: {value}")]
    InvalidParameter { what: &'static str, value: f64 },

    #[error("Not supported: {what}")]
    NotSupported { what: &'static str },

    #[error("State size mismatch: expected {expected} values, got {actual}")]
    StateSize { expected: usize, actual: usize },

    #[error("Fluid error: {0}")]
    Fluid(#[from] FluidError),

    #[error("Controller error: {0}")]
    Control(#[from] ControlError),
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl From<ComponentError> for HnError {
    fn from(e: ComponentError) -> Self {
        HnError::InvalidArg {
            what: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ComponentError::InvalidParameter {
            what: "diameter",
            value: 0.0,
        };
        assert!(err.to_string().contains("diameter"));
    }

    #[test]
    fn error_conversion() {
        let err: HnError = ComponentError::NotSupported { what: "x" }.into();
        assert!(matches!(err, HnError::InvalidArg { .. }));
    }
}
