//! Sparse matrix storage and the iterative linear solver.
//!
//! This module provides a lightweight sparse matrix (CSR format), a Jacobi
//! preconditioned conjugate gradient method for symmetric positive
//! (semi-)definite systems, and the [`LinearSolver`] interface through which the
//! mappers invoke it.

use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

/// Compressed Sparse Row (CSR) matrix.
///
/// Stores a sparse matrix in CSR format for efficient matrix-vector multiplication.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrMatrix {
    /// Number of rows.
    rows: usize,
    /// Number of columns.
    cols: usize,
    /// Row pointers: row_ptr[i] is the index in col_idx/values where row i starts.
    /// Length is rows + 1, with row_ptr[rows] = nnz.
    row_ptr: Vec<usize>,
    /// Column indices for each non-zero value, ascending within a row.
    col_idx: Vec<usize>,
    /// Non-zero values.
    values: Vec<f64>,
}

impl CsrMatrix {
    /// Create an empty matrix with no stored entries.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            row_ptr: vec![0; rows + 1],
            col_idx: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Create a CSR matrix from triplets (row, col, value).
    ///
    /// Duplicate entries at the same (row, col) are summed.
    pub fn from_triplets(rows: usize, cols: usize, mut triplets: Vec<(usize, usize, f64)>) -> Self {
        if triplets.is_empty() {
            return Self::zeros(rows, cols);
        }

        triplets.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut row_counts = vec![0usize; rows];
        let mut col_idx = Vec::with_capacity(triplets.len());
        let mut values: Vec<f64> = Vec::with_capacity(triplets.len());
        let mut prev = None;

        for (row, col, val) in triplets {
            debug_assert!(row < rows && col < cols, "triplet ({row}, {col}) out of bounds");
            match values.last_mut() {
                Some(last) if prev == Some((row, col)) => *last += val,
                _ => {
                    col_idx.push(col);
                    values.push(val);
                    row_counts[row] += 1;
                    prev = Some((row, col));
                }
            }
        }

        let mut row_ptr = vec![0usize; rows + 1];
        for r in 0..rows {
            row_ptr[r + 1] = row_ptr[r] + row_counts[r];
        }

        Self {
            rows,
            cols,
            row_ptr,
            col_idx,
            values,
        }
    }

    /// Get the number of rows.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.rows
    }

    /// Get the number of columns.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// Get the number of stored non-zero entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Iterate over the stored `(col, value)` entries of a row.
    pub fn row(&self, r: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.row_ptr[r]..self.row_ptr[r + 1];
        self.col_idx[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    /// Get the entry at (r, c), zero if not stored.
    pub fn get(&self, r: usize, c: usize) -> f64 {
        let range = self.row_ptr[r]..self.row_ptr[r + 1];
        match self.col_idx[range.clone()].binary_search(&c) {
            Ok(k) => self.values[range.start + k],
            Err(_) => 0.0,
        }
    }

    /// Get the main diagonal.
    pub fn diagonal(&self) -> DVector<f64> {
        DVector::from_iterator(
            self.rows.min(self.cols),
            (0..self.rows.min(self.cols)).map(|r| self.get(r, r)),
        )
    }

    /// Check whether the matrix is exactly symmetric.
    pub fn is_symmetric(&self) -> bool {
        self.rows == self.cols
            && (0..self.rows).all(|r| self.row(r).all(|(c, v)| self.get(c, r) == v))
    }

    /// Multiply matrix by vector: y = A * x.
    pub fn mul_vec(&self, x: &DVector<f64>) -> DVector<f64> {
        assert_eq!(x.len(), self.cols, "Vector dimension mismatch");

        let mut y = DVector::zeros(self.rows);
        for i in 0..self.rows {
            y[i] = self.row(i).map(|(c, v)| v * x[c]).sum();
        }
        y
    }
}

/// Result of an iterative solve.
#[derive(Debug, Clone)]
pub struct CgOutcome {
    /// The final iterate.
    pub x: DVector<f64>,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Relative residual `|b - A x| / |b|` of the final iterate.
    pub error: f64,
}

/// Solve A*x = b using the Jacobi preconditioned Conjugate Gradient method.
///
/// Requires A to be symmetric positive semi-definite. Rows with a zero diagonal
/// are left unscaled by the preconditioner. Rows without non-zero entries keep
/// their initial guess, also when `b` is zero.
///
/// # Arguments
///
/// * `a` - The system matrix
/// * `b` - The right-hand side vector
/// * `x0` - Optional initial guess (zeros if None)
/// * `max_iter` - Maximum number of iterations
/// * `tolerance` - Convergence tolerance on the relative residual norm
///
/// # Returns
///
/// The last iterate together with the iteration count and relative residual.
/// Reaching `max_iter` is not an error; the caller inspects `error` instead.
pub fn conjugate_gradient(
    a: &CsrMatrix,
    b: &DVector<f64>,
    x0: Option<&DVector<f64>>,
    max_iter: usize,
    tolerance: f64,
) -> CgOutcome {
    let n = b.len();
    assert_eq!(a.nrows(), n, "Matrix-vector dimension mismatch");
    assert_eq!(a.ncols(), n, "Matrix must be square");

    let b_norm_sq = b.norm_squared();
    if b_norm_sq == 0.0 {
        // Homogeneous system: zero, except unconstrained (all-zero) rows keep x0
        let x = DVector::from_fn(n, |r, _| match x0 {
            Some(x0) if a.row(r).all(|(_, v)| v == 0.0) => x0[r],
            _ => 0.0,
        });
        return CgOutcome {
            x,
            iterations: 0,
            error: 0.0,
        };
    }

    let mut x = match x0 {
        Some(x0) => x0.clone(),
        None => DVector::zeros(n),
    };

    let inv_diag = a
        .diagonal()
        .map(|d| if d != 0.0 { 1.0 / d } else { 1.0 });

    let threshold = (tolerance * tolerance * b_norm_sq).max(f64::MIN_POSITIVE);

    // r = b - A*x
    let mut r = b - a.mul_vec(&x);
    let mut r_norm_sq = r.norm_squared();
    if r_norm_sq < threshold {
        return CgOutcome {
            x,
            iterations: 0,
            error: (r_norm_sq / b_norm_sq).sqrt(),
        };
    }

    let mut p = r.component_mul(&inv_diag);
    let mut rz = r.dot(&p);
    let mut iterations = 0;

    while iterations < max_iter {
        iterations += 1;

        let ap = a.mul_vec(&p);
        let p_ap = p.dot(&ap);
        if p_ap <= 0.0 {
            // Search direction in the null space
            break;
        }
        let alpha = rz / p_ap;

        x.axpy(alpha, &p, 1.0);
        r.axpy(-alpha, &ap, 1.0);

        r_norm_sq = r.norm_squared();
        if r_norm_sq < threshold {
            break;
        }

        let z = r.component_mul(&inv_diag);
        let rz_new = r.dot(&z);
        let beta = rz_new / rz;
        p = z + beta * p;
        rz = rz_new;
    }

    CgOutcome {
        x,
        iterations,
        error: (r_norm_sq / b_norm_sq).sqrt(),
    }
}

/// Default convergence tolerance used when none is configured.
pub const DEFAULT_TOLERANCE: f64 = f64::EPSILON;

/// Stopping criteria passed to a [`LinearSolver`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverSettings {
    /// Iteration cap; `0` selects the solver default.
    pub max_iterations: usize,
    /// Relative residual tolerance; non-positive selects the solver default.
    pub tolerance: f64,
    /// Solve the right-hand side columns in parallel.
    pub parallel: bool,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            max_iterations: 0,
            tolerance: 0.0,
            parallel: true,
        }
    }
}

impl SolverSettings {
    /// Iteration cap for a system with `n` unknowns.
    pub fn effective_max_iterations(&self, n: usize) -> usize {
        if self.max_iterations > 0 {
            self.max_iterations
        } else {
            2 * n
        }
    }

    /// Convergence tolerance.
    pub fn effective_tolerance(&self) -> f64 {
        if self.tolerance > 0.0 {
            self.tolerance
        } else {
            DEFAULT_TOLERANCE
        }
    }
}

/// Solution of a multi-column linear system.
#[derive(Debug, Clone)]
pub struct LinearSolution {
    /// Solution, one column per right-hand side column.
    pub x: DMatrix<f64>,
    /// Largest iteration count over all columns.
    pub iterations: usize,
    /// Largest relative residual over all columns.
    pub error: f64,
}

/// Iterative solver for `A X = B` with a symmetric system matrix.
pub trait LinearSolver: Send + Sync {
    /// Solve for `X`, starting from the initial guess `x0`.
    fn solve(
        &self,
        a: &CsrMatrix,
        b: &DMatrix<f64>,
        x0: &DMatrix<f64>,
        settings: &SolverSettings,
    ) -> LinearSolution;
}

/// Jacobi preconditioned conjugate gradient, applied column by column.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConjugateGradient;

impl LinearSolver for ConjugateGradient {
    fn solve(
        &self,
        a: &CsrMatrix,
        b: &DMatrix<f64>,
        x0: &DMatrix<f64>,
        settings: &SolverSettings,
    ) -> LinearSolution {
        assert_eq!(b.shape(), x0.shape(), "Initial guess dimension mismatch");

        let max_iter = settings.effective_max_iterations(a.nrows());
        let tolerance = settings.effective_tolerance();
        let solve_column = |l: usize| {
            let guess = x0.column(l).clone_owned();
            conjugate_gradient(a, &b.column(l).clone_owned(), Some(&guess), max_iter, tolerance)
        };

        let outcomes: Vec<CgOutcome> = if settings.parallel {
            (0..b.ncols()).into_par_iter().map(solve_column).collect()
        } else {
            (0..b.ncols()).map(solve_column).collect()
        };

        let mut x = DMatrix::zeros(b.nrows(), b.ncols());
        let mut iterations = 0;
        let mut error: f64 = 0.0;
        for (l, outcome) in outcomes.into_iter().enumerate() {
            x.set_column(l, &outcome.x);
            iterations = iterations.max(outcome.iterations);
            error = error.max(outcome.error);
        }

        LinearSolution {
            x,
            iterations,
            error,
        }
    }
}
