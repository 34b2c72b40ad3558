//! Common utilities for element calculations.

use crate::error::{ComponentError, ComponentResult};

/// Absolute forward-difference step for mass-flux partials (kg/s).
pub const FD_MASS_FLUX_STEP: f64 = 1e-5;

/// Default fluid temperature before any input arrives (K).
pub const DEFAULT_FLUID_TEMPERATURE: f64 = 293.15;

/// Ensure a parameter is finite and strictly positive.
pub fn check_positive(value: f64, what: &'static str) -> ComponentResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ComponentError::InvalidParameter { what, value })
    }
}

/// Ensure a parameter is finite and non-negative.
pub fn check_non_negative(value: f64, what: &'static str) -> ComponentResult<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ComponentError::InvalidParameter { what, value })
    }
}

/// Ensure a parameter is finite.
pub fn check_finite(value: f64, what: &'static str) -> ComponentResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ComponentError::InvalidParameter { what, value })
    }
}

/// Circular cross-section area for diameter `d` (m²).
pub fn circle_area(d: f64) -> f64 {
    std::f64::consts::PI * d * d / 4.0
}

/// Forward difference of `f` at `mdot` with [`FD_MASS_FLUX_STEP`].
pub fn mass_flux_derivative(f: impl Fn(f64) -> f64, mdot: f64) -> f64 {
    (f(mdot + FD_MASS_FLUX_STEP) - f(mdot)) / FD_MASS_FLUX_STEP
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_positive() {
        assert!(check_positive(1.0, "x").is_ok());
        assert!(check_positive(0.0, "x").is_err());
        assert!(check_positive(f64::NAN, "x").is_err());
        assert!(check_non_negative(0.0, "x").is_ok());
        assert!(check_non_negative(-1.0, "x").is_err());
        assert!(check_finite(f64::INFINITY, "x").is_err());
    }

    #[test]
    fn test_circle_area() {
        assert!((circle_area(2.0) - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn test_mass_flux_derivative_linear() {
        let d = mass_flux_derivative(|m| 3.0 * m + 1.0, 0.7);
        assert!((d - 3.0).abs() < 1e-6);
    }
}
