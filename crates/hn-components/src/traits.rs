//! Core trait for flow elements.

use hn_core::units::{MassRate, Pressure, Temperature};

use crate::error::{ComponentError, ComponentResult};

/// Partial derivatives of a system function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Partials {
    pub d_mdot: f64,
    pub d_p_in: f64,
    pub d_p_out: f64,
}

/// Time-varying values an element may consume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementInput {
    /// Fluid temperature for viscosity-dependent friction.
    FluidTemperature(Temperature),
    /// Override of a pump's pressure head.
    PressureHead(Pressure),
    /// Override of a pump's fixed mass flux.
    MassFlux(MassRate),
    /// Override of an attached controller's mass flux setpoint.
    ControllerSetpoint(MassRate),
}

impl ElementInput {
    pub fn name(&self) -> &'static str {
        match self {
            ElementInput::FluidTemperature(_) => "fluid temperature",
            ElementInput::PressureHead(_) => "pressure head",
            ElementInput::MassFlux(_) => "mass flux",
            ElementInput::ControllerSetpoint(_) => "controller setpoint",
        }
    }
}

/// A hydraulic element between an inlet and an outlet node.
///
/// Sign conventions:
/// - `mdot` is positive when flowing inlet → outlet (kg/s)
/// - pressures are absolute (Pa)
pub trait FlowElement: std::fmt::Debug + Send {
    /// Short type name for diagnostics.
    fn type_name(&self) -> &'static str;

    /// Residual that is zero exactly when the element's physical law holds.
    fn system_function(&self, mdot: f64, p_in: f64, p_out: f64) -> f64;

    /// Partial derivatives of [`FlowElement::system_function`].
    fn partials(&self, mdot: f64, p_in: f64, p_out: f64) -> Partials;

    /// Deliver a runtime input.
    ///
    /// Every element accepts `FluidTemperature`; elements without
    /// temperature-dependent physics ignore it. Other inputs an element does
    /// not consume return `NotSupported`.
    fn set_input(&mut self, input: ElementInput) -> ComponentResult<()> {
        match input {
            ElementInput::FluidTemperature(_) => Ok(()),
            _ => Err(ComponentError::NotSupported { what: input.name() }),
        }
    }

    /// Number of persisted `f64` state values.
    fn state_size(&self) -> usize {
        0
    }

    /// Write persisted state into `out` (length `state_size()`).
    fn write_state(&self, _out: &mut [f64]) {}

    /// Restore persisted state from `data` (length `state_size()`).
    fn read_state(&mut self, data: &[f64]) -> ComponentResult<()> {
        if data.is_empty() {
            Ok(())
        } else {
            Err(ComponentError::StateSize {
                expected: 0,
                actual: data.len(),
            })
        }
    }

    /// Advance internal state over an accepted step of length `dt` (s).
    fn step_completed(&mut self, _dt: f64, _mdot: f64) {}
}
