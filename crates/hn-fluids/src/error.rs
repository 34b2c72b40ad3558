//! Fluid property errors.

use hn_core::HnError;
use thiserror::Error;

/// Result type for fluid operations.
pub type FluidResult<T> = Result<T, FluidError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FluidError {
    /// Non-physical values (negative density, heat capacity, etc.).
    #[error("Non-physical value for {what}: {value}")]
    NonPhysical { what: &'static str, value: f64 },

    /// Spline table is malformed.
    #[error("Invalid spline table: {what}")]
    InvalidSpline { what: &'static str },
}

impl From<FluidError> for HnError {
    fn from(err: FluidError) -> Self {
        HnError::InvalidArg {
            what: format!("fluid: {}", err),
        }
    }
}
