//! Fixed-step explicit integration of the thermal states.

use tracing::{debug, warn};

use crate::error::{ThermalError, ThermalResult};
use crate::model::ThermalNetworkModel;

/// Forward Euler with a flow-based time step.
///
/// The step is `courant * min(rho V / |mdot|)` over all flowing elements,
/// which keeps the upwinded transport stable.
#[derive(Debug, Clone, Copy)]
pub struct ForwardEuler {
    pub courant: f64,
    pub max_steps: usize,
    /// Largest remaining temperature rate in K/s counted as steady.
    pub tolerance: f64,
}

impl Default for ForwardEuler {
    fn default() -> Self {
        Self {
            courant: 0.5,
            max_steps: 100_000,
            tolerance: 1e-7,
        }
    }
}

impl ForwardEuler {
    /// Stable time step in s for the given mass fluxes.
    pub fn time_step(&self, model: &ThermalNetworkModel, mass_fluxes: &[f64]) -> ThermalResult<f64> {
        let dt = model
            .elements()
            .iter()
            .zip(mass_fluxes)
            .filter(|(_, mdot)| mdot.abs() > 0.0)
            .map(|(e, mdot)| e.volume().mass() / mdot.abs())
            .fold(f64::INFINITY, f64::min);
        if dt.is_finite() {
            Ok(self.courant * dt)
        } else {
            Err(ThermalError::InvalidParameter {
                what: "time step (no element carries flow)",
                value: dt,
            })
        }
    }

    /// Advance `y` by `dt`, returning the largest temperature rate in K/s.
    pub fn step(
        &self,
        model: &mut ThermalNetworkModel,
        mass_fluxes: &[f64],
        y: &mut [f64],
        dt: f64,
    ) -> ThermalResult<f64> {
        model.set_internal_states(y)?;
        model.advect(mass_fluxes)?;
        let mut ydot = vec![0.0; y.len()];
        model.internal_derivatives(&mut ydot)?;
        let mut max_rate: f64 = 0.0;
        for ((yi, di), e) in y.iter_mut().zip(&ydot).zip(model.elements()) {
            *yi += dt * di;
            let v = e.volume();
            max_rate = max_rate.max((di / (v.mass() * v.heat_capacity)).abs());
        }
        Ok(max_rate)
    }

    /// Integrate at constant mass fluxes until the temperatures settle.
    ///
    /// Returns the number of steps taken. On return the model's results
    /// describe the final states.
    pub fn relax(
        &self,
        model: &mut ThermalNetworkModel,
        mass_fluxes: &[f64],
        y: &mut [f64],
    ) -> ThermalResult<usize> {
        let dt = self.time_step(model, mass_fluxes)?;
        for n in 1..=self.max_steps {
            let rate = self.step(model, mass_fluxes, y, dt)?;
            if rate < self.tolerance {
                model.set_internal_states(y)?;
                model.advect(mass_fluxes)?;
                debug!(steps = n, dt, "thermal states settled");
                return Ok(n);
            }
        }
        warn!(
            max_steps = self.max_steps,
            "thermal states did not settle; returning last states"
        );
        model.set_internal_states(y)?;
        model.advect(mass_fluxes)?;
        Ok(self.max_steps)
    }
}
