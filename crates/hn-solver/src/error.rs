//! Error types for solver operations.

use hn_components::ComponentError;
use hn_core::HnError;
use hn_graph::GraphError;
use thiserror::Error;

/// Errors raised during setup or solving.
///
/// Setup errors (topology, parameters, configuration) are fatal for the given
/// network. Numerical errors during `solve()` are recoverable: the caller is
/// expected to retry with different inputs, e.g. a smaller time step.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("Topology error: {0}")]
    Graph(#[from] GraphError),

    #[error("Flow element with id {id}: {source}")]
    Element { id: u32, source: ComponentError },

    #[error("Invalid solver configuration: {what}")]
    Config { what: String },

    #[error("Singular Jacobian in Newton iteration {iteration} (pivot step {step})")]
    SingularJacobian { iteration: usize, step: usize },

    #[error("Non-finite residual in equation {index}")]
    NonFiniteResidual { index: usize },

    #[error("Serialized state size mismatch: expected {expected} bytes, got {actual}")]
    StateSize { expected: usize, actual: usize },
}

impl SolverError {
    /// Whether the failure may go away with different inputs.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SolverError::SingularJacobian { .. } | SolverError::NonFiniteResidual { .. }
        )
    }
}

pub type SolverResult<T> = Result<T, SolverError>;

impl From<SolverError> for HnError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::Graph(g) => g.into(),
            SolverError::SingularJacobian { .. } | SolverError::NonFiniteResidual { .. } => {
                HnError::Numerical {
                    what: e.to_string(),
                }
            }
            other => HnError::InvalidArg {
                what: other.to_string(),
            },
        }
    }
}
