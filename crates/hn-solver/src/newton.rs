//! Newton iteration on the hydraulic equation system.

use hn_components::FlowElement;
use hn_core::numeric::wrms_norm;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::NewtonConfig;
use crate::error::{SolverError, SolverResult};
use crate::jacobian::SparseJacobian;
use crate::linear::LinearSolver;
use crate::system::HydraulicSystem;

/// Outcome of one `solve()` call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SolveReport {
    /// Newton corrections applied.
    pub iterations: usize,
    /// WRMS norm of the final residual.
    pub residual_norm: f64,
    /// False when the iteration budget ran out first.
    pub converged: bool,
}

/// Mutable pieces a Newton run works on.
pub(crate) struct NewtonWorkspace<'a> {
    pub system: &'a HydraulicSystem,
    pub elements: &'a [Box<dyn FlowElement>],
    pub jacobian: &'a mut SparseJacobian,
    pub linear: &'a mut dyn LinearSolver,
    pub g: &'a mut [f64],
}

/// Iterate `y` towards `G(y) = 0`.
///
/// Stops once the residual norm is below tolerance and at least one
/// correction has been applied. A singular Jacobian aborts with a
/// recoverable error. Running out of iterations is not an error: the last
/// iterate is kept and the report says `converged: false`.
pub(crate) fn iterate(
    ws: NewtonWorkspace<'_>,
    y: &mut [f64],
    config: &NewtonConfig,
) -> SolverResult<SolveReport> {
    let NewtonWorkspace {
        system,
        elements,
        jacobian,
        linear,
        g,
    } = ws;
    let n = system.dim();
    let ne = system.element_count();
    let mut rhs = vec![0.0; n];

    let mut iteration = 0;
    loop {
        system.residuals(elements, y, g)?;
        let norm = wrms_norm(g);
        debug!(iteration, residual_norm = norm, "newton iteration");

        if norm < config.residual_tolerance && iteration > 0 {
            return Ok(SolveReport {
                iterations: iteration,
                residual_norm: norm,
                converged: true,
            });
        }
        if iteration == config.max_iterations {
            warn!(
                iterations = iteration,
                residual_norm = norm,
                "hydraulic network did not converge within the iteration budget"
            );
            return Ok(SolveReport {
                iterations: iteration,
                residual_norm: norm,
                converged: false,
            });
        }

        jacobian.update(
            y,
            g,
            config.jacobian_eps_rel,
            config.jacobian_eps_abs,
            |yp, gp| system.residuals(elements, yp, gp),
        )?;
        linear.factorize(jacobian).map_err(|e| match e {
            SolverError::SingularJacobian { step, .. } => {
                SolverError::SingularJacobian { iteration, step }
            }
            other => other,
        })?;

        for (r, gi) in rhs.iter_mut().zip(g.iter()) {
            *r = -gi;
        }
        linear.solve(&mut rhs)?;

        let scale = if config.clip_mass_flux_step {
            mass_flux_step_scale(&y[..ne], &rhs[..ne])
        } else {
            1.0
        };
        for (yi, dy) in y.iter_mut().zip(&rhs) {
            *yi += scale * dy;
        }
        iteration += 1;
    }
}

/// Largest step fraction in (0, 1] that keeps positive mass fluxes from
/// crossing zero. Fluxes land at 0.01 (scaled) instead.
fn mass_flux_step_scale(y: &[f64], dy: &[f64]) -> f64 {
    y.iter()
        .zip(dy)
        .filter(|&(&yi, &di)| yi > 0.01 && yi + di < 0.0)
        .map(|(&yi, &di)| (0.01 - yi) / di)
        .fold(1.0, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_scale_limits_sign_flip() {
        let s = mass_flux_step_scale(&[10.0, 5.0], &[-20.0, 1.0]);
        assert!((s - (0.01 - 10.0) / -20.0).abs() < 1e-12);
        assert!(10.0 + s * -20.0 > 0.0);
    }

    #[test]
    fn step_scale_untouched_without_flip() {
        assert_eq!(mass_flux_step_scale(&[10.0, -5.0], &[-5.0, -1.0]), 1.0);
    }
}
