//! Solver configuration.

use serde::{Deserialize, Serialize};

use crate::error::{SolverError, SolverResult};

/// Linear algebra backend for the Newton correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinearSolverKind {
    /// Dense LU, fine for small networks.
    Dense,
    /// Sparse LU with symbolic analysis done once at setup.
    #[default]
    Sparse,
}

/// Newton solver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewtonConfig {
    /// Maximum Newton iterations per `solve()`.
    pub max_iterations: usize,
    /// Convergence threshold on the WRMS norm of the residual.
    pub residual_tolerance: f64,
    /// Factor applied to mass fluxes in the unknown vector and to nodal balances.
    pub mass_flux_scale: f64,
    /// Relative finite-difference perturbation.
    pub jacobian_eps_rel: f64,
    /// Absolute finite-difference perturbation (Pa or scaled kg/s).
    pub jacobian_eps_abs: f64,
    pub linear_solver: LinearSolverKind,
    /// Shorten steps that would flip a positive mass flux negative.
    pub clip_mass_flux_step: bool,
    /// Mass flux seed before the first solve (kg/s).
    pub initial_mass_flux: f64,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 30,
            residual_tolerance: 1e-3,
            mass_flux_scale: 1000.0,
            jacobian_eps_rel: 1e-6,
            jacobian_eps_abs: 1e-6,
            linear_solver: LinearSolverKind::Sparse,
            clip_mass_flux_step: false,
            initial_mass_flux: 0.1,
        }
    }
}

impl NewtonConfig {
    pub fn validate(&self) -> SolverResult<()> {
        let positive = [
            ("residual_tolerance", self.residual_tolerance),
            ("mass_flux_scale", self.mass_flux_scale),
            ("jacobian_eps_abs", self.jacobian_eps_abs),
        ];
        for (what, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SolverError::Config {
                    what: format!("{what} must be positive, got {value}"),
                });
            }
        }
        if !(self.jacobian_eps_rel.is_finite() && self.jacobian_eps_rel >= 0.0) {
            return Err(SolverError::Config {
                what: format!(
                    "jacobian_eps_rel must be non-negative, got {}",
                    self.jacobian_eps_rel
                ),
            });
        }
        if self.max_iterations == 0 {
            return Err(SolverError::Config {
                what: "max_iterations must be at least 1".to_string(),
            });
        }
        if !self.initial_mass_flux.is_finite() {
            return Err(SolverError::Config {
                what: "initial_mass_flux must be finite".to_string(),
            });
        }
        Ok(())
    }
}
