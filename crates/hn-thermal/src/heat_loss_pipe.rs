//! Pipe losing heat to a surrounding at fixed temperature.

use std::f64::consts::PI;

use hn_core::units::Temperature;
use hn_fluids::{Fluid, LinearSpline};

use crate::element::{MixedVolume, ThermalElement, check_positive};
use crate::error::{ThermalError, ThermalResult};

/// Below this mass flux the outlet-temperature formulation is replaced by
/// a loss based on the mixed fluid temperature.
const MIN_MASS_FLUX: f64 = 1e-9;

const RE_LAMINAR: f64 = 2300.0;
const RE_TURBULENT: f64 = 1.0e4;

/// Mean Nusselt number for developing laminar flow with constant wall
/// temperature.
pub fn nusselt_laminar(re: f64, pr: f64, diameter: f64, length: f64) -> f64 {
    let graetz = (re * pr * diameter / length).cbrt();
    (49.37 + (1.615 * graetz - 0.7).powi(3)).cbrt()
}

/// Dittus–Boelter for a cooled fluid.
pub fn nusselt_turbulent(re: f64, pr: f64) -> f64 {
    0.023 * re.powf(0.8) * pr.powf(0.3)
}

/// Nusselt number over all flow regimes, blended linearly in the
/// transition band.
pub fn nusselt(re: f64, pr: f64, diameter: f64, length: f64) -> f64 {
    if re <= RE_LAMINAR {
        nusselt_laminar(re, pr, diameter, length)
    } else if re >= RE_TURBULENT {
        nusselt_turbulent(re, pr)
    } else {
        let lam = nusselt_laminar(RE_LAMINAR, pr, diameter, length);
        let turb = nusselt_turbulent(RE_TURBULENT, pr);
        let w = (re - RE_LAMINAR) / (RE_TURBULENT - RE_LAMINAR);
        lam + w * (turb - lam)
    }
}

/// Bundle of `n_parallel` buried or exposed pipes.
///
/// ```text
/// UA = n * pi * L / ( 1/(alpha_i D) + 1/(alpha_o D) + 1/(2 U_wall) )
/// Q  = |mdot| cp (T_in - T_amb) (1 - exp(-UA / (|mdot| cp)))
/// ```
///
/// `U_wall` is the length-specific wall conductance in W/(m·K).
#[derive(Debug, Clone)]
pub struct HeatLossPipe {
    volume: MixedVolume,
    length: f64,
    diameter: f64,
    n_parallel: u32,
    u_value_wall: f64,
    outer_alpha: f64,
    ambient_temperature: f64,
    conductivity: f64,
    viscosity_table: LinearSpline,
}

impl HeatLossPipe {
    pub fn new(
        length: f64,
        inner_diameter: f64,
        n_parallel: u32,
        u_value_wall: f64,
        outer_alpha: f64,
        ambient_temperature: Temperature,
        fluid: &Fluid,
    ) -> ThermalResult<Self> {
        let length = check_positive(length, "pipe length")?;
        let diameter = check_positive(inner_diameter, "pipe inner diameter")?;
        let u_value_wall = check_positive(u_value_wall, "wall U-value")?;
        let outer_alpha = check_positive(outer_alpha, "outer heat transfer coefficient")?;
        let ambient_temperature = check_positive(ambient_temperature.value, "ambient temperature")?;
        if n_parallel == 0 {
            return Err(ThermalError::InvalidParameter {
                what: "number of parallel pipes",
                value: 0.0,
            });
        }
        let volume = f64::from(n_parallel) * PI / 4.0 * diameter * diameter * length;
        Ok(Self {
            volume: MixedVolume::new(volume, fluid)?,
            length,
            diameter,
            n_parallel,
            u_value_wall,
            outer_alpha,
            ambient_temperature,
            conductivity: fluid.conductivity,
            viscosity_table: fluid.kinematic_viscosity.clone(),
        })
    }

    pub fn ambient_temperature(&self) -> f64 {
        self.ambient_temperature
    }

    /// Inner heat transfer coefficient in W/(m²·K) for the current inflow.
    pub fn inner_alpha(&self) -> f64 {
        let v = &self.volume;
        let t = if v.inlet_specific_enthalpy > 0.0 {
            v.inlet_temperature()
        } else {
            v.temperature()
        };
        let nu = self.viscosity_table.value(t);
        let area = PI / 4.0 * self.diameter * self.diameter;
        let velocity = v.mass_flux / f64::from(self.n_parallel) / (v.density * area);
        let re = velocity * self.diameter / nu;
        let pr = nu * v.density * v.heat_capacity / self.conductivity;
        nusselt(re, pr, self.diameter, self.length) * self.conductivity / self.diameter
    }

    /// Overall heat transfer capacity of the whole bundle in W/K.
    pub fn ua(&self) -> f64 {
        let resistance = 1.0 / (self.inner_alpha() * self.diameter)
            + 1.0 / (self.outer_alpha * self.diameter)
            + 1.0 / (2.0 * self.u_value_wall);
        f64::from(self.n_parallel) * PI * self.length / resistance
    }
}

impl ThermalElement for HeatLossPipe {
    fn type_name(&self) -> &'static str {
        "HeatLossPipe"
    }

    fn volume(&self) -> &MixedVolume {
        &self.volume
    }

    fn volume_mut(&mut self) -> &mut MixedVolume {
        &mut self.volume
    }

    fn ambient_heat_loss(&self) -> f64 {
        let v = &self.volume;
        let ua = self.ua();
        if v.mass_flux < MIN_MASS_FLUX {
            return ua * (v.temperature() - self.ambient_temperature);
        }
        let capacity_rate = v.mass_flux * v.heat_capacity;
        capacity_rate
            * (v.inlet_temperature() - self.ambient_temperature)
            * (1.0 - (-ua / capacity_rate).exp())
    }

    fn set_ambient_temperature(&mut self, t: Temperature) -> ThermalResult<()> {
        self.ambient_temperature = check_positive(t.value, "ambient temperature")?;
        Ok(())
    }
}
