//! Mass flux controller producing zeta corrections.
//!
//! Control law with `e = mdot - setpoint`:
//!
//! ```text
//! P:   zeta = kp * e
//! PI:  zeta = kp * e + kp / ti * integral(e dt)
//! ```
//!
//! The result is clipped to `[0, max_zeta]`: a controller may only add
//! resistance, never remove the element's base loss.

use crate::error::{ControlError, ControlResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerKind {
    P,
    PI,
}

/// Controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassFluxController {
    pub kind: ControllerKind,
    /// Mass flux setpoint (kg/s).
    pub setpoint: f64,
    /// Proportional gain (zeta per kg/s).
    pub kp: f64,
    /// Integral time constant (s). Only used by PI.
    #[serde(default = "default_ti")]
    pub ti: f64,
    /// Upper bound of the zeta correction.
    pub max_zeta: f64,
}

fn default_ti() -> f64 {
    1.0
}

impl MassFluxController {
    /// Create a proportional controller.
    pub fn p(setpoint: f64, kp: f64, max_zeta: f64) -> ControlResult<Self> {
        let c = Self {
            kind: ControllerKind::P,
            setpoint,
            kp,
            ti: default_ti(),
            max_zeta,
        };
        c.validate()?;
        Ok(c)
    }

    /// Create a proportional-integral controller.
    pub fn pi(setpoint: f64, kp: f64, ti: f64, max_zeta: f64) -> ControlResult<Self> {
        let c = Self {
            kind: ControllerKind::PI,
            setpoint,
            kp,
            ti,
            max_zeta,
        };
        c.validate()?;
        Ok(c)
    }

    pub fn validate(&self) -> ControlResult<()> {
        if !self.kp.is_finite() || self.kp <= 0.0 {
            return Err(ControlError::InvalidArg {
                what: "kp must be positive",
            });
        }
        if self.kind == ControllerKind::PI && (!self.ti.is_finite() || self.ti <= 0.0) {
            return Err(ControlError::InvalidArg {
                what: "ti must be positive",
            });
        }
        if !self.max_zeta.is_finite() || self.max_zeta <= 0.0 {
            return Err(ControlError::InvalidArg {
                what: "max_zeta must be positive",
            });
        }
        if !self.setpoint.is_finite() {
            return Err(ControlError::InvalidArg {
                what: "setpoint must be finite",
            });
        }
        Ok(())
    }

    /// Zeta correction for the current mass flux.
    pub fn zeta_correction(&self, state: &MassFluxControllerState, mdot: f64) -> f64 {
        let error = mdot - self.setpoint;
        let raw = match self.kind {
            ControllerKind::P => self.kp * error,
            ControllerKind::PI => self.kp * error + self.kp / self.ti * state.integral,
        };
        raw.clamp(0.0, self.max_zeta)
    }

    /// Advance the controller over a completed step of length `dt`.
    ///
    /// The integral is held while the output is saturated and the error
    /// would push it further into saturation.
    pub fn step_completed(&self, state: &mut MassFluxControllerState, mdot: f64, dt: f64) {
        if self.kind != ControllerKind::PI || dt <= 0.0 {
            return;
        }
        let error = mdot - self.setpoint;
        let raw = self.kp * error + self.kp / self.ti * state.integral;
        let saturated_high = raw >= self.max_zeta && error > 0.0;
        let saturated_low = raw <= 0.0 && error < 0.0;
        if !(saturated_high || saturated_low) {
            state.integral += error * dt;
        }
    }
}

/// Persisted controller state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MassFluxControllerState {
    /// Integral of the control error (kg).
    pub integral: f64,
}
