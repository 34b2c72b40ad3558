//! Sparse left-looking LU factorization (Gilbert–Peierls).
//!
//! Factorizes `A Q = L U` where `Q` orders the columns by ascending nonzero
//! count, computed once from the pattern. `L` is unit lower triangular in pivoted
//! row order and `U` is upper triangular. Row pivoting is partial: each step
//! picks the largest remaining entry of the current column.
//!
//! Each column `k` of `L` and `U` comes from one sparse triangular solve
//! `L x = A[:, q_k]`; the nonzero structure of `x` is found by a depth-first
//! search through the columns of `L` computed so far.

use tracing::{debug, warn};

use crate::error::{SolverError, SolverResult};
use crate::jacobian::SparseJacobian;
use crate::linear::LinearSolver;

const UNSET: usize = usize::MAX;

/// Sparse LU with one-time symbolic analysis.
#[derive(Debug, Clone)]
pub struct SparseLu {
    n: usize,
    /// Column preorder: step k factorizes column `q[k]`.
    q: Vec<usize>,
    numeric: Option<Numeric>,
}

#[derive(Debug, Clone)]
struct Numeric {
    /// Strictly lower part of column k: (original row, value).
    l: Vec<Vec<(usize, f64)>>,
    /// Strictly upper part of column k: (step, value).
    u: Vec<Vec<(usize, f64)>>,
    u_diag: Vec<f64>,
    /// Original row chosen as pivot at step k.
    pivot_row: Vec<usize>,
}

impl SparseLu {
    /// Symbolic analysis: order columns by ascending nonzero count.
    pub fn analyze(jacobian: &SparseJacobian) -> Self {
        let n = jacobian.dim();
        let mut q: Vec<usize> = (0..n).collect();
        q.sort_by_key(|&j| jacobian.column(j).count());
        debug!(dim = n, "sparse LU symbolic analysis done");
        Self {
            n,
            q,
            numeric: None,
        }
    }

    /// Column preorder from the symbolic analysis.
    pub fn column_order(&self) -> &[usize] {
        &self.q
    }

    /// Total stored entries in L and U (including the diagonal).
    pub fn factor_nnz(&self) -> usize {
        self.numeric.as_ref().map_or(0, |f| {
            f.l.iter().map(Vec::len).sum::<usize>() + f.u.iter().map(Vec::len).sum::<usize>() + self.n
        })
    }

    fn factor(&self, jacobian: &SparseJacobian) -> SolverResult<Numeric> {
        let n = self.n;
        let mut l: Vec<Vec<(usize, f64)>> = Vec::with_capacity(n);
        let mut u: Vec<Vec<(usize, f64)>> = Vec::with_capacity(n);
        let mut u_diag = Vec::with_capacity(n);
        let mut pivot_row = Vec::with_capacity(n);
        // step at which a row was pivoted
        let mut pinv = vec![UNSET; n];

        let mut x = vec![0.0; n];
        let mut mark = vec![UNSET; n];
        let mut topo: Vec<usize> = Vec::with_capacity(n);
        let mut stack: Vec<(usize, usize)> = Vec::new();

        for k in 0..n {
            let col = self.q[k];

            // reach of A[:, col] in the graph of L, in reverse topological order
            topo.clear();
            for (row, value) in jacobian.column(col) {
                x[row] = value;
                if mark[row] != k {
                    mark[row] = k;
                    stack.push((row, 0));
                    while let Some(top) = stack.last_mut() {
                        let node = top.0;
                        let step = pinv[node];
                        let mut next = None;
                        if step != UNSET {
                            while top.1 < l[step].len() {
                                let r = l[step][top.1].0;
                                top.1 += 1;
                                if mark[r] != k {
                                    next = Some(r);
                                    break;
                                }
                            }
                        }
                        match next {
                            Some(r) => {
                                mark[r] = k;
                                stack.push((r, 0));
                            }
                            None => {
                                stack.pop();
                                topo.push(node);
                            }
                        }
                    }
                }
            }

            // sparse triangular solve L x = A[:, col]
            for &row in topo.iter().rev() {
                let step = pinv[row];
                if step == UNSET {
                    continue;
                }
                let xj = x[row];
                for &(r, lv) in &l[step] {
                    x[r] -= lv * xj;
                }
            }

            // split into U column and pivot candidates
            let mut u_col = Vec::new();
            let mut pivot = UNSET;
            let mut pivot_abs = -1.0;
            for &row in &topo {
                if pinv[row] != UNSET {
                    u_col.push((pinv[row], x[row]));
                } else if x[row].abs() > pivot_abs {
                    pivot_abs = x[row].abs();
                    pivot = row;
                }
            }

            if pivot == UNSET || !(pivot_abs > 0.0) || !pivot_abs.is_finite() {
                for &row in &topo {
                    x[row] = 0.0;
                }
                warn!(step = k, column = col, "sparse LU: zero pivot");
                return Err(SolverError::SingularJacobian {
                    iteration: 0,
                    step: k,
                });
            }

            let diag = x[pivot];
            pinv[pivot] = k;
            let l_col = topo
                .iter()
                .filter(|&&row| pinv[row] == UNSET)
                .map(|&row| (row, x[row] / diag))
                .collect();
            for &row in &topo {
                x[row] = 0.0;
            }

            l.push(l_col);
            u.push(u_col);
            u_diag.push(diag);
            pivot_row.push(pivot);
        }

        Ok(Numeric {
            l,
            u,
            u_diag,
            pivot_row,
        })
    }
}

impl LinearSolver for SparseLu {
    fn factorize(&mut self, jacobian: &SparseJacobian) -> SolverResult<()> {
        self.numeric = None;
        if jacobian.dim() != self.n {
            return Err(SolverError::Config {
                what: format!(
                    "sparse LU analyzed for dimension {}, got {}",
                    self.n,
                    jacobian.dim()
                ),
            });
        }
        self.numeric = Some(self.factor(jacobian)?);
        Ok(())
    }

    fn solve(&self, rhs: &mut [f64]) -> SolverResult<()> {
        let f = self
            .numeric
            .as_ref()
            .ok_or(SolverError::SingularJacobian {
                iteration: 0,
                step: 0,
            })?;
        let n = self.n;

        // forward: w = L^-1 b, L columns live in original row space
        let mut w = vec![0.0; n];
        for k in 0..n {
            let wk = rhs[f.pivot_row[k]];
            w[k] = wk;
            for &(r, lv) in &f.l[k] {
                rhs[r] -= lv * wk;
            }
        }

        // backward: z = U^-1 w, column oriented
        for k in (0..n).rev() {
            let zk = w[k] / f.u_diag[k];
            w[k] = zk;
            for &(j, uv) in &f.u[k] {
                w[j] -= uv * zk;
            }
        }

        // undo the column preorder
        for k in 0..n {
            rhs[self.q[k]] = w[k];
        }
        Ok(())
    }
}
