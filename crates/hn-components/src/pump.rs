//! Pump elements.
//!
//! Both pumps are idealized: one fixes the pressure head, the other the mass
//! flux. Place at most one of them per independent flow cycle; a cycle with
//! two fixed-flux pumps has no solution.

use hn_core::units::{MassRate, Pressure};

use crate::common::check_finite;
use crate::error::{ComponentError, ComponentResult};
use crate::traits::{ElementInput, FlowElement, Partials};

/// Pump adding a fixed pressure head.
///
/// ```text
/// G = p_in - p_out + dp_head
/// ```
#[derive(Debug, Clone)]
pub struct ConstantPressurePump {
    pressure_head: f64,
}

impl ConstantPressurePump {
    pub fn new(pressure_head: Pressure) -> ComponentResult<Self> {
        Ok(Self {
            pressure_head: check_finite(pressure_head.value, "pressure head")?,
        })
    }

    /// Pressure head currently in effect (Pa).
    pub fn pressure_head(&self) -> f64 {
        self.pressure_head
    }
}

impl FlowElement for ConstantPressurePump {
    fn type_name(&self) -> &'static str {
        "ConstantPressurePump"
    }

    fn system_function(&self, _mdot: f64, p_in: f64, p_out: f64) -> f64 {
        p_in - p_out + self.pressure_head
    }

    fn partials(&self, _mdot: f64, _p_in: f64, _p_out: f64) -> Partials {
        Partials {
            d_mdot: 0.0,
            d_p_in: 1.0,
            d_p_out: -1.0,
        }
    }

    fn set_input(&mut self, input: ElementInput) -> ComponentResult<()> {
        match input {
            ElementInput::FluidTemperature(_) => Ok(()),
            ElementInput::PressureHead(head) => {
                self.pressure_head = check_finite(head.value, "pressure head")?;
                Ok(())
            }
            _ => Err(ComponentError::NotSupported { what: input.name() }),
        }
    }
}

/// Pump enforcing a fixed mass flux.
///
/// ```text
/// G = mdot - mdot_fixed
/// ```
#[derive(Debug, Clone)]
pub struct ConstantMassFluxPump {
    mass_flux: f64,
}

impl ConstantMassFluxPump {
    pub fn new(mass_flux: MassRate) -> ComponentResult<Self> {
        Ok(Self {
            mass_flux: check_finite(mass_flux.value, "mass flux")?,
        })
    }

    /// Mass flux currently enforced (kg/s).
    pub fn mass_flux(&self) -> f64 {
        self.mass_flux
    }
}

impl FlowElement for ConstantMassFluxPump {
    fn type_name(&self) -> &'static str {
        "ConstantMassFluxPump"
    }

    fn system_function(&self, mdot: f64, _p_in: f64, _p_out: f64) -> f64 {
        mdot - self.mass_flux
    }

    fn partials(&self, _mdot: f64, _p_in: f64, _p_out: f64) -> Partials {
        Partials {
            d_mdot: 1.0,
            d_p_in: 0.0,
            d_p_out: 0.0,
        }
    }

    fn set_input(&mut self, input: ElementInput) -> ComponentResult<()> {
        match input {
            ElementInput::FluidTemperature(_) => Ok(()),
            ElementInput::MassFlux(mdot) => {
                self.mass_flux = check_finite(mdot.value, "mass flux")?;
                Ok(())
            }
            _ => Err(ComponentError::NotSupported { what: input.name() }),
        }
    }
}
