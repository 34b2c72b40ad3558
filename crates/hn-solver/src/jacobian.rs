//! Sparse finite-difference Jacobian with column coloring.
//!
//! The sparsity pattern is fixed by the network topology:
//!
//! ```text
//! element row e:  columns e, E + inlet(e), E + outlet(e)
//! node row E + n: columns of all adjacent elements
//!                 (+ column E + n for the reference node)
//! ```
//!
//! Columns that never share a row get the same color and are perturbed
//! together, so a refresh costs one residual evaluation per color.

use nalgebra::DMatrix;
use nalgebra_sparse::CsrMatrix;
use nalgebra_sparse::pattern::SparsityPattern;
use tracing::debug;

use crate::error::{SolverError, SolverResult};
use crate::system::HydraulicSystem;

/// Greedy column coloring of a sparsity pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coloring {
    /// Color of each column.
    colors: Vec<usize>,
    /// Columns grouped by color.
    groups: Vec<Vec<usize>>,
}

impl Coloring {
    /// Color the columns of `csr` using its transpose `csc` for column access.
    ///
    /// Each column takes the smallest color not used by any already colored
    /// column that shares a row with it.
    pub fn greedy(csr: &SparsityPattern, csc: &SparsityPattern) -> Self {
        let n = csc.major_dim();
        let mut colors = vec![usize::MAX; n];
        // forbidden[c] == j + 1 marks color c as taken for column j
        let mut forbidden = vec![0usize; n + 1];
        let mut groups: Vec<Vec<usize>> = Vec::new();

        for j in 0..n {
            for &row in csc.lane(j) {
                for &other in csr.lane(row) {
                    let c = colors[other];
                    if c != usize::MAX {
                        forbidden[c] = j + 1;
                    }
                }
            }
            let color = (0..=n).find(|&c| forbidden[c] != j + 1).unwrap_or(n);
            colors[j] = color;
            if color == groups.len() {
                groups.push(Vec::new());
            }
            groups[color].push(j);
        }
        Self { colors, groups }
    }

    pub fn color_count(&self) -> usize {
        self.groups.len()
    }

    pub fn color(&self, column: usize) -> usize {
        self.colors[column]
    }

    /// Columns sharing color `c`.
    pub fn group(&self, c: usize) -> &[usize] {
        &self.groups[c]
    }

    /// True if no two columns of the same color share a row of `csr`.
    pub fn is_valid_for(&self, csr: &SparsityPattern) -> bool {
        (0..csr.major_dim()).all(|row| {
            let lane = csr.lane(row);
            let mut seen: Vec<usize> = lane.iter().map(|&c| self.colors[c]).collect();
            seen.sort_unstable();
            seen.windows(2).all(|w| w[0] != w[1])
        })
    }
}

/// Jacobian stored as CSR with a transpose index for column access.
#[derive(Debug, Clone)]
pub struct SparseJacobian {
    matrix: CsrMatrix<f64>,
    transpose: SparsityPattern,
    /// For each entry of `transpose`, the position of the same entry in `matrix.values()`.
    transpose_positions: Vec<usize>,
    coloring: Coloring,
    /// Columns `< mass_flux_columns` hold scaled mass fluxes.
    mass_flux_columns: usize,
    perturbed: Vec<f64>,
}

impl SparseJacobian {
    /// Build the pattern for `system` and color it.
    pub fn for_system(system: &HydraulicSystem) -> SolverResult<Self> {
        let ne = system.element_count();
        let n = system.dim();
        let mut rows: Vec<Vec<usize>> = Vec::with_capacity(n);

        for (e, &(inlet, outlet)) in system.connections().iter().enumerate() {
            rows.push(vec![e, ne + inlet, ne + outlet]);
        }
        for (i, adjacent) in system.node_elements().iter().enumerate() {
            let mut cols: Vec<usize> = adjacent.iter().map(|&(e, _)| e).collect();
            if i == system.reference_node() {
                cols.push(ne + i);
            }
            rows.push(cols);
        }

        let mut offsets = Vec::with_capacity(n + 1);
        let mut indices = Vec::new();
        offsets.push(0);
        for mut cols in rows {
            cols.sort_unstable();
            cols.dedup();
            indices.extend(cols);
            offsets.push(indices.len());
        }

        let pattern = SparsityPattern::try_from_offsets_and_indices(n, n, offsets, indices)
            .map_err(|e| SolverError::Config {
                what: format!("invalid Jacobian pattern: {e}"),
            })?;
        Self::from_pattern(pattern, ne)
    }

    /// Wrap an arbitrary square pattern.
    pub fn from_pattern(pattern: SparsityPattern, mass_flux_columns: usize) -> SolverResult<Self> {
        if pattern.major_dim() != pattern.minor_dim() {
            return Err(SolverError::Config {
                what: "Jacobian pattern must be square".to_string(),
            });
        }
        let n = pattern.major_dim();
        let transpose = pattern.transpose();
        let coloring = Coloring::greedy(&pattern, &transpose);

        let mut cursor: Vec<usize> = transpose.major_offsets()[..n].to_vec();
        let mut transpose_positions = vec![0; pattern.nnz()];
        for row in 0..n {
            let start = pattern.major_offsets()[row];
            for (k, &col) in pattern.lane(row).iter().enumerate() {
                transpose_positions[cursor[col]] = start + k;
                cursor[col] += 1;
            }
        }

        let nnz = pattern.nnz();
        let matrix = CsrMatrix::try_from_pattern_and_values(pattern, vec![0.0; nnz]).map_err(
            |e| SolverError::Config {
                what: format!("invalid Jacobian storage: {e}"),
            },
        )?;

        debug!(
            dim = n,
            nnz,
            colors = coloring.color_count(),
            "Jacobian pattern built"
        );

        Ok(Self {
            matrix,
            transpose,
            transpose_positions,
            coloring,
            mass_flux_columns,
            perturbed: vec![0.0; n],
        })
    }

    pub fn dim(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn nnz(&self) -> usize {
        self.matrix.nnz()
    }

    pub fn coloring(&self) -> &Coloring {
        &self.coloring
    }

    pub fn matrix(&self) -> &CsrMatrix<f64> {
        &self.matrix
    }

    pub fn pattern(&self) -> &SparsityPattern {
        self.matrix.pattern()
    }

    /// Row indices and values of column `j`.
    pub fn column(&self, j: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let start = self.transpose.major_offsets()[j];
        let values = self.matrix.values();
        self.transpose
            .lane(j)
            .iter()
            .enumerate()
            .map(move |(k, &row)| (row, values[self.transpose_positions[start + k]]))
    }

    /// Overwrite all values.
    pub fn set_values(&mut self, values: &[f64]) {
        self.matrix.values_mut().copy_from_slice(values);
    }

    /// Dense copy, used by the dense backend.
    pub fn to_dense(&self) -> DMatrix<f64> {
        let n = self.dim();
        let mut dense = DMatrix::zeros(n, n);
        for (i, j, v) in self.matrix.triplet_iter() {
            dense[(i, j)] = *v;
        }
        dense
    }

    /// `out = J * x`.
    pub fn multiply(&self, x: &[f64], out: &mut [f64]) {
        for (i, o) in out.iter_mut().enumerate() {
            let row = self.matrix.row(i);
            *o = row
                .col_indices()
                .iter()
                .zip(row.values())
                .map(|(&j, v)| v * x[j])
                .sum();
        }
    }

    /// Perturbation used for column `j` at value `yj`.
    ///
    /// Mass fluxes never change sign inside a difference quotient: positive
    /// fluxes larger than the step are perturbed downwards, and fluxes within
    /// one step of zero are pushed further away from it.
    fn epsilon(&self, j: usize, yj: f64, eps_rel: f64, eps_abs: f64) -> f64 {
        let eps = eps_rel * yj.abs() + eps_abs;
        if j >= self.mass_flux_columns {
            return eps;
        }
        if yj > eps || (yj < 0.0 && yj >= -eps) {
            -eps
        } else {
            eps
        }
    }

    /// Refresh all values by colored forward differences around `y`.
    ///
    /// `g0` must hold `G(y)`. `y` is restored exactly before returning.
    pub fn update<F>(
        &mut self,
        y: &mut [f64],
        g0: &[f64],
        eps_rel: f64,
        eps_abs: f64,
        mut residuals: F,
    ) -> SolverResult<()>
    where
        F: FnMut(&[f64], &mut [f64]) -> SolverResult<()>,
    {
        let n = self.dim();
        let mut g1 = vec![0.0; n];
        let mut eps = vec![0.0; n];

        for c in 0..self.coloring.color_count() {
            let group = self.coloring.groups[c].clone();
            for &j in &group {
                eps[j] = self.epsilon(j, y[j], eps_rel, eps_abs);
                self.perturbed[j] = y[j];
                y[j] += eps[j];
            }

            let evaluated = residuals(y, &mut g1);

            for &j in &group {
                y[j] = self.perturbed[j];
            }
            evaluated?;

            let values = self.matrix.values_mut();
            for &j in &group {
                let start = self.transpose.major_offsets()[j];
                for (k, &row) in self.transpose.lane(j).iter().enumerate() {
                    values[self.transpose_positions[start + k]] = (g1[row] - g0[row]) / eps[j];
                }
            }
        }
        Ok(())
    }
}
