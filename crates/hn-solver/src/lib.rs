//! Steady-state hydraulic network solver.
//!
//! Unknowns are the element mass fluxes (scaled) followed by the node
//! pressures:
//!
//! ```text
//! y = [ mdot_0 * s, ..., mdot_{E-1} * s, p_0, ..., p_{N-1} ]
//! ```
//!
//! The residual has the same layout: one system function per element, then
//! one mass balance per node. The node carrying the reference pressure gets
//! `p_ref_node - p_ref` added to its balance, which closes the otherwise
//! pressure-difference-only system.
//!
//! Newton iterations use a finite-difference Jacobian. Its sparsity pattern
//! and a column coloring are built once at setup so that one residual
//! evaluation per color fills the whole matrix. Factorization uses either a
//! dense LU (nalgebra) or a sparse left-looking LU.

pub mod config;
pub mod error;
pub mod jacobian;
pub mod linear;
pub mod model;
pub mod newton;
pub mod results;
pub mod sparse_lu;
pub mod system;

pub use config::{LinearSolverKind, NewtonConfig};
pub use error::{SolverError, SolverResult};
pub use jacobian::{Coloring, SparseJacobian};
pub use linear::{DenseLu, LinearSolver};
pub use model::HydraulicNetworkModel;
pub use newton::SolveReport;
pub use results::{ElementResult, HydraulicResults};
pub use sparse_lu::SparseLu;
pub use system::HydraulicSystem;
