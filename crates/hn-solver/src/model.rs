//! Hydraulic network model: setup, time coupling, solving and persistence.

use hn_components::{ElementInput, ElementParams, FlowElement};
use hn_core::units::{Pressure, Temperature};
use hn_fluids::Fluid;
use hn_graph::Network;
use tracing::{debug, info};

use crate::config::NewtonConfig;
use crate::error::{SolverError, SolverResult};
use crate::jacobian::SparseJacobian;
use crate::linear::{self, LinearSolver};
use crate::newton::{self, NewtonWorkspace, SolveReport};
use crate::results::HydraulicResults;
use crate::system::HydraulicSystem;

const F64_BYTES: usize = std::mem::size_of::<f64>();

/// A hydraulic network driven by an outer time integrator.
///
/// Typical call sequence per outer step:
///
/// ```text
/// set_time(t) -> update() ... update() -> step_completed(t)
/// ```
///
/// `update()` may run many times at the same `t`; only `step_completed`
/// moves the restart point `y_last`.
#[derive(Debug)]
pub struct HydraulicNetworkModel {
    network: Network,
    elements: Vec<Box<dyn FlowElement>>,
    system: HydraulicSystem,
    jacobian: SparseJacobian,
    linear: Box<dyn LinearSolver>,
    config: NewtonConfig,
    density: f64,
    /// Working unknowns.
    y: Vec<f64>,
    /// Unknowns at the last completed step.
    y_last: Vec<f64>,
    g: Vec<f64>,
    new_step: bool,
    time: f64,
    last_completed_time: f64,
    results: HydraulicResults,
    last_report: Option<SolveReport>,
}

impl HydraulicNetworkModel {
    /// Instantiate elements, build the Jacobian pattern and coloring, and
    /// run the linear solver's symbolic analysis.
    ///
    /// `params` runs parallel to `network.elements()`.
    pub fn setup(
        network: Network,
        params: &[ElementParams],
        fluid: &Fluid,
        reference_pressure: Pressure,
        config: NewtonConfig,
    ) -> SolverResult<Self> {
        config.validate()?;
        fluid.validate().map_err(|e| SolverError::Config {
            what: e.to_string(),
        })?;
        if params.len() != network.element_count() {
            return Err(SolverError::Config {
                what: format!(
                    "{} parameter blocks for {} flow elements",
                    params.len(),
                    network.element_count()
                ),
            });
        }
        if !reference_pressure.value.is_finite() {
            return Err(SolverError::Config {
                what: "reference pressure must be finite".to_string(),
            });
        }

        let elements = network
            .elements()
            .iter()
            .zip(params)
            .map(|(element, p)| {
                p.instantiate(fluid).map_err(|source| SolverError::Element {
                    id: element.id,
                    source,
                })
            })
            .collect::<SolverResult<Vec<_>>>()?;

        let system = HydraulicSystem::new(&network, reference_pressure.value, config.mass_flux_scale);
        let jacobian = SparseJacobian::for_system(&system)?;
        let linear = linear::create(config.linear_solver, &jacobian);

        info!(
            nodes = system.node_count(),
            elements = system.element_count(),
            nnz = jacobian.nnz(),
            colors = jacobian.coloring().color_count(),
            backend = ?config.linear_solver,
            "hydraulic network set up"
        );

        let y = system.initial_guess(config.initial_mass_flux);
        let dim = system.dim();
        Ok(Self {
            network,
            elements,
            system,
            jacobian,
            linear,
            density: fluid.density,
            y_last: y.clone(),
            y,
            g: vec![0.0; dim],
            new_step: true,
            time: 0.0,
            last_completed_time: 0.0,
            results: HydraulicResults::default(),
            last_report: None,
            config,
        })
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn config(&self) -> &NewtonConfig {
        &self.config
    }

    /// Move to time point `t` (s). A different time starts a new step:
    /// the next solve begins from the last completed solution.
    pub fn set_time(&mut self, t: f64) {
        if t != self.time {
            self.time = t;
            self.new_step = true;
        }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    /// Deliver a runtime input to the element with caller ID `id`.
    pub fn set_input(&mut self, id: u32, input: ElementInput) -> SolverResult<()> {
        let e = self.network.index_map().element_idx(id)?;
        self.elements[e]
            .set_input(input)
            .map_err(|source| SolverError::Element { id, source })
    }

    /// Broadcast a fluid temperature to all elements.
    pub fn set_fluid_temperature(&mut self, t: Temperature) -> SolverResult<()> {
        for (element, fe) in self.network.elements().iter().zip(self.elements.iter_mut()) {
            fe.set_input(ElementInput::FluidTemperature(t))
                .map_err(|source| SolverError::Element {
                    id: element.id,
                    source,
                })?;
        }
        Ok(())
    }

    /// Run Newton iterations for the current inputs.
    ///
    /// On error the unknowns are restored to their value before the call.
    pub fn solve(&mut self) -> SolverResult<SolveReport> {
        if self.new_step {
            self.y.copy_from_slice(&self.y_last);
            self.new_step = false;
        }
        let before = self.y.clone();

        let ws = NewtonWorkspace {
            system: &self.system,
            elements: &self.elements,
            jacobian: &mut self.jacobian,
            linear: self.linear.as_mut(),
            g: &mut self.g,
        };
        match newton::iterate(ws, &mut self.y, &self.config) {
            Ok(report) => {
                debug!(
                    iterations = report.iterations,
                    residual_norm = report.residual_norm,
                    converged = report.converged,
                    "hydraulic solve finished"
                );
                self.results = HydraulicResults::from_solution(
                    &self.network,
                    &self.system,
                    self.density,
                    &self.y,
                    report,
                );
                self.last_report = Some(report);
                Ok(report)
            }
            Err(e) => {
                self.y = before;
                Err(e)
            }
        }
    }

    /// Solve and map the outcome to a status code.
    ///
    /// `0` success (possibly not converged, see [`SolveReport`]), `1`
    /// recoverable failure, `-1` anything else.
    pub fn update(&mut self) -> i32 {
        match self.solve() {
            Ok(_) => 0,
            Err(e) if e.is_recoverable() => {
                debug!(error = %e, "recoverable hydraulic failure");
                1
            }
            Err(e) => {
                tracing::error!(error = %e, "hydraulic solve failed");
                -1
            }
        }
    }

    /// Accept the current solution as the state at time `t`.
    ///
    /// Copies `y` into `y_last` and advances element internal state (e.g.
    /// controller integrals) over `t - t_last`.
    pub fn step_completed(&mut self, t: f64) {
        self.y_last.copy_from_slice(&self.y);
        let dt = t - self.last_completed_time;
        for (e, element) in self.elements.iter_mut().enumerate() {
            element.step_completed(dt, self.system.mass_flux(&self.y, e));
        }
        self.last_completed_time = t;
        self.time = t;
    }

    pub fn results(&self) -> &HydraulicResults {
        &self.results
    }

    /// Current unknown vector `[mdot * scale, p]`.
    pub fn unknowns(&self) -> &[f64] {
        &self.y
    }

    /// Mass fluxes (kg/s) in element order.
    pub fn mass_fluxes(&self) -> Vec<f64> {
        (0..self.system.element_count())
            .map(|e| self.system.mass_flux(&self.y, e))
            .collect()
    }

    /// Node pressures (Pa) in dense node order.
    pub fn node_pressures(&self) -> Vec<f64> {
        (0..self.system.node_count())
            .map(|n| self.system.pressure(&self.y, n))
            .collect()
    }

    /// Signed mass balance (kg/s) per node for the current unknowns.
    pub fn node_balances(&self) -> Vec<f64> {
        self.system.node_balances(&self.y)
    }

    /// Residual norm of the last successful solve.
    pub fn residual_norm(&self) -> Option<f64> {
        self.last_report.map(|r| r.residual_norm)
    }

    pub fn jacobian_nnz(&self) -> usize {
        self.jacobian.nnz()
    }

    pub fn color_count(&self) -> usize {
        self.jacobian.coloring().color_count()
    }

    fn state_len(&self) -> usize {
        self.y_last.len() + self.elements.iter().map(|e| e.state_size()).sum::<usize>() + 1
    }

    /// Bytes needed by [`HydraulicNetworkModel::serialize`].
    pub fn serialized_size(&self) -> usize {
        self.state_len() * F64_BYTES
    }

    /// Write `y_last`, element states and the last completed time as
    /// native-endian `f64` values.
    pub fn serialize(&self, out: &mut [u8]) -> SolverResult<()> {
        let expected = self.serialized_size();
        if out.len() != expected {
            return Err(SolverError::StateSize {
                expected,
                actual: out.len(),
            });
        }
        let mut values = Vec::with_capacity(self.state_len());
        values.extend_from_slice(&self.y_last);
        for element in &self.elements {
            let start = values.len();
            values.resize(start + element.state_size(), 0.0);
            element.write_state(&mut values[start..]);
        }
        values.push(self.last_completed_time);

        for (chunk, v) in out.chunks_exact_mut(F64_BYTES).zip(&values) {
            chunk.copy_from_slice(&v.to_ne_bytes());
        }
        Ok(())
    }

    /// Restore state written by [`HydraulicNetworkModel::serialize`].
    ///
    /// The next solve starts from the restored `y_last`.
    pub fn deserialize(&mut self, data: &[u8]) -> SolverResult<()> {
        let expected = self.serialized_size();
        if data.len() != expected {
            return Err(SolverError::StateSize {
                expected,
                actual: data.len(),
            });
        }
        let mut values = Vec::with_capacity(self.state_len());
        for chunk in data.chunks_exact(F64_BYTES) {
            let mut bytes = [0u8; F64_BYTES];
            bytes.copy_from_slice(chunk);
            values.push(f64::from_ne_bytes(bytes));
        }

        let n = self.y_last.len();
        let mut offset = n;
        for (element, fe) in self.network.elements().iter().zip(self.elements.iter_mut()) {
            let size = fe.state_size();
            fe.read_state(&values[offset..offset + size])
                .map_err(|source| SolverError::Element {
                    id: element.id,
                    source,
                })?;
            offset += size;
        }
        self.y_last.copy_from_slice(&values[..n]);
        self.y.copy_from_slice(&values[..n]);
        self.last_completed_time = values[offset];
        self.time = self.last_completed_time;
        self.new_step = true;
        Ok(())
    }
}
