//! Linear solver backends for the Newton correction.

use nalgebra::linalg::LU;
use nalgebra::{DVector, Dyn};
use tracing::warn;

use crate::config::LinearSolverKind;
use crate::error::{SolverError, SolverResult};
use crate::jacobian::SparseJacobian;
use crate::sparse_lu::SparseLu;

/// Factorize-then-solve interface shared by the dense and sparse backends.
///
/// `factorize` is called once per Newton iteration with freshly computed
/// Jacobian values; the previous numeric factorization is discarded.
pub trait LinearSolver: std::fmt::Debug + Send {
    fn factorize(&mut self, jacobian: &SparseJacobian) -> SolverResult<()>;

    /// Overwrite `rhs` with the solution of `J x = rhs`.
    fn solve(&self, rhs: &mut [f64]) -> SolverResult<()>;
}

/// Create the backend selected in the configuration.
pub fn create(kind: LinearSolverKind, jacobian: &SparseJacobian) -> Box<dyn LinearSolver> {
    match kind {
        LinearSolverKind::Dense => Box::new(DenseLu::default()),
        LinearSolverKind::Sparse => Box::new(SparseLu::analyze(jacobian)),
    }
}

/// Dense LU with partial pivoting (nalgebra).
#[derive(Debug, Default)]
pub struct DenseLu {
    lu: Option<LU<f64, Dyn, Dyn>>,
}

impl LinearSolver for DenseLu {
    fn factorize(&mut self, jacobian: &SparseJacobian) -> SolverResult<()> {
        self.lu = None;
        let lu = jacobian.to_dense().lu();
        if !lu.is_invertible() {
            warn!(dim = jacobian.dim(), "dense LU: singular Jacobian");
            return Err(SolverError::SingularJacobian {
                iteration: 0,
                step: 0,
            });
        }
        self.lu = Some(lu);
        Ok(())
    }

    fn solve(&self, rhs: &mut [f64]) -> SolverResult<()> {
        let singular = SolverError::SingularJacobian {
            iteration: 0,
            step: 0,
        };
        let lu = self.lu.as_ref().ok_or_else(|| singular.clone())?;
        let mut b = DVector::from_column_slice(rhs);
        if !lu.solve_mut(&mut b) {
            return Err(singular);
        }
        rhs.copy_from_slice(b.as_slice());
        Ok(())
    }
}
