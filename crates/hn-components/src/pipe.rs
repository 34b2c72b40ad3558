//! Pipe element with Darcy–Weisbach friction.

use hn_core::units::{Length, Temperature};
use hn_fluids::{Fluid, LinearSpline};

use crate::common::{
    DEFAULT_FLUID_TEMPERATURE, check_non_negative, check_positive, circle_area,
    mass_flux_derivative,
};
use crate::error::{ComponentError, ComponentResult};
use crate::friction::{RE_LAMINAR, friction_factor};
use crate::traits::{ElementInput, FlowElement, Partials};

/// Bundle of `n_parallel` identical pipes.
///
/// ```text
/// v  = (mdot / n) / (rho * A)
/// Re = |v| * D / nu(T)
/// dp = f(Re) * L / D * rho / 2 * |v| * v
/// G  = p_in - p_out - dp
/// ```
#[derive(Debug, Clone)]
pub struct Pipe {
    length: f64,
    diameter: f64,
    roughness: f64,
    n_parallel: u32,
    density: f64,
    viscosity_table: LinearSpline,
    /// Kinematic viscosity at the current fluid temperature (m²/s).
    viscosity: f64,
}

impl Pipe {
    pub fn new(
        length: Length,
        diameter: Length,
        roughness: Length,
        n_parallel: u32,
        fluid: &Fluid,
    ) -> ComponentResult<Self> {
        fluid.validate()?;
        let length = check_positive(length.value, "pipe length")?;
        let diameter = check_positive(diameter.value, "pipe diameter")?;
        let roughness = check_non_negative(roughness.value, "pipe roughness")?;
        if n_parallel == 0 {
            return Err(ComponentError::InvalidParameter {
                what: "number of parallel pipes",
                value: 0.0,
            });
        }
        let viscosity_table = fluid.kinematic_viscosity.clone();
        let viscosity = viscosity_table.value(DEFAULT_FLUID_TEMPERATURE);
        Ok(Self {
            length,
            diameter,
            roughness,
            n_parallel,
            density: fluid.density,
            viscosity_table,
            viscosity,
        })
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    /// Kinematic viscosity currently in use (m²/s).
    pub fn viscosity(&self) -> f64 {
        self.viscosity
    }

    pub fn set_fluid_temperature(&mut self, t: Temperature) {
        self.viscosity = self.viscosity_table.value(t.value);
    }

    /// Reynolds number for the total mass flux `mdot`.
    pub fn reynolds(&self, mdot: f64) -> f64 {
        self.velocity(mdot).abs() * self.diameter / self.viscosity
    }

    fn velocity(&self, mdot: f64) -> f64 {
        let per_pipe = mdot / f64::from(self.n_parallel);
        per_pipe / (self.density * circle_area(self.diameter))
    }

    /// Friction pressure loss in flow direction for total mass flux `mdot` (Pa).
    pub fn pressure_loss(&self, mdot: f64) -> f64 {
        let v = self.velocity(mdot);
        let re = v.abs() * self.diameter / self.viscosity;
        let l_over_d = self.length / self.diameter;
        if re < RE_LAMINAR {
            // 64/Re * |v| folded together so that v = 0 stays finite
            64.0 * self.viscosity / self.diameter * l_over_d * self.density / 2.0 * v
        } else {
            let f = friction_factor(re, self.roughness / self.diameter);
            f * l_over_d * self.density / 2.0 * v.abs() * v
        }
    }
}

impl FlowElement for Pipe {
    fn type_name(&self) -> &'static str {
        "Pipe"
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
        match input {
            ElementInput::FluidTemperature(t) => {
                self.set_fluid_temperature(t);
                Ok(())
            }
            _ => Err(ComponentError::NotSupported { what: input.name() }),
        }
    }
}
