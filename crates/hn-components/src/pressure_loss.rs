//! Generic pressure loss element with a zeta value.

use hn_controls::{MassFluxController, MassFluxControllerState};
use hn_core::units::Length;
use hn_fluids::Fluid;

use crate::common::{check_non_negative, check_positive, circle_area, mass_flux_derivative};
use crate::error::{ComponentError, ComponentResult};
use crate::traits::{ElementInput, FlowElement, Partials};

/// Pressure loss `zeta * rho / 2 * |v| * v` across a fitting, valve or consumer.
///
/// With an attached controller the effective zeta is `zeta + correction(mdot)`,
/// where the controller clips its correction to be non-negative.
#[derive(Debug, Clone)]
pub struct PressureLossCoefficient {
    zeta: f64,
    area: f64,
    density: f64,
    controller: Option<MassFluxController>,
    controller_state: MassFluxControllerState,
}

impl PressureLossCoefficient {
    pub fn new(zeta: f64, diameter: Length, fluid: &Fluid) -> ComponentResult<Self> {
        fluid.validate()?;
        Ok(Self {
            zeta: check_non_negative(zeta, "zeta")?,
            area: circle_area(check_positive(diameter.value, "diameter")?),
            density: fluid.density,
            controller: None,
            controller_state: MassFluxControllerState::default(),
        })
    }

    /// Attach a mass flux controller.
    pub fn with_controller(mut self, controller: MassFluxController) -> ComponentResult<Self> {
        controller.validate()?;
        self.controller = Some(controller);
        Ok(self)
    }

    pub fn controller(&self) -> Option<&MassFluxController> {
        self.controller.as_ref()
    }

    /// Effective zeta at mass flux `mdot`.
    pub fn zeta(&self, mdot: f64) -> f64 {
        match &self.controller {
            Some(c) => self.zeta + c.zeta_correction(&self.controller_state, mdot),
            None => self.zeta,
        }
    }

    /// Pressure loss in flow direction (Pa).
    pub fn pressure_loss(&self, mdot: f64) -> f64 {
        let v = mdot / (self.density * self.area);
        self.zeta(mdot) * self.density / 2.0 * v.abs() * v
    }
}

impl FlowElement for PressureLossCoefficient {
    fn type_name(&self) -> &'static str {
        "PressureLossCoefficient"
    }

    fn system_function(&self, mdot: f64, p_in: f64, p_out: f64) -> f64 {
        p_in - p_out - self.pressure_loss(mdot)
    }

    fn partials(&self, mdot: f64, p_in: f64, p_out: f64) -> Partials {
        Partials {
            d_mdot: mass_flux_derivative(|m| self.system_function(m, p_in, p_out), mdot),
            d_p_in: 1.0,
            d_p_out: -1.0,
        }
    }

    fn set_input(&mut self, input: ElementInput) -> ComponentResult<()> {
        match (input, self.controller.as_mut()) {
            (ElementInput::FluidTemperature(_), _) => Ok(()),
            (ElementInput::ControllerSetpoint(sp), Some(c)) => {
                c.setpoint = sp.value;
                c.validate()?;
                Ok(())
            }
            _ => Err(ComponentError::NotSupported { what: input.name() }),
        }
    }

    fn state_size(&self) -> usize {
        usize::from(self.controller.is_some())
    }

    fn write_state(&self, out: &mut [f64]) {
        if self.controller.is_some() {
            if let Some(slot) = out.first_mut() {
                *slot = self.controller_state.integral;
            }
        }
    }

    fn read_state(&mut self, data: &[f64]) -> ComponentResult<()> {
        let expected = self.state_size();
        if data.len() != expected {
            return Err(ComponentError::StateSize {
                expected,
                actual: data.len(),
            });
        }
        if let Some(&integral) = data.first() {
            self.controller_state.integral = integral;
        }
        Ok(())
    }

    fn step_completed(&mut self, dt: f64, mdot: f64) {
        if let Some(c) = &self.controller {
            c.step_completed(&mut self.controller_state, mdot, dt);
        }
    }
}
