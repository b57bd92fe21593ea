//! Dense linear solves used by homography estimation.
//!
//! Gaussian elimination with partial pivoting. Rank deficiency is reported
//! rather than raised: variables whose pivot falls below tolerance are left
//! at zero and listed in [`LinearSolution::deficient`], so the caller decides
//! whether the result is usable.

use nalgebra::{DMatrix, DVector};

/// Default relative pivot tolerance.
pub const PIVOT_TOLERANCE: f64 = 1e-10;

/// Errors returned by the linear solvers.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LinearSolveError {
    #[error("dimension mismatch: matrix is {rows}x{cols}, right-hand side has {rhs} entries")]
    DimensionMismatch { rows: usize, cols: usize, rhs: usize },
    #[error("underdetermined system: {rows} equations for {cols} unknowns")]
    Underdetermined { rows: usize, cols: usize },
}

/// Solution vector plus the columns that could not be determined.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearSolution {
    /// Solution in input column order.
    pub x: DVector<f64>,
    /// Column indices whose pivot fell below tolerance (their `x` entry is 0).
    pub deficient: Vec<usize>,
}

impl LinearSolution {
    pub fn is_full_rank(&self) -> bool {
        self.deficient.is_empty()
    }
}

/// Solve the square system `a * x = b`.
///
/// `tolerance` is relative to the largest absolute entry of `a` (floored at
/// 1), so uniformly scaled systems degrade the same way.
pub fn solve_gaussian(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    tolerance: f64,
) -> Result<LinearSolution, LinearSolveError> {
    let n = a.nrows();
    if a.ncols() != n || b.len() != n {
        return Err(LinearSolveError::DimensionMismatch {
            rows: n,
            cols: a.ncols(),
            rhs: b.len(),
        });
    }

    if n == 0 {
        return Ok(LinearSolution {
            x: DVector::zeros(0),
            deficient: Vec::new(),
        });
    }

    let tol = tolerance * a.amax().max(1.0);
    let mut m = a.clone();
    let mut rhs = b.clone();
    let mut has_pivot = vec![false; n];

    for col in 0..n {
        let mut pivot_row = col;
        let mut pivot_abs = m[(col, col)].abs();
        for r in (col + 1)..n {
            let v = m[(r, col)].abs();
            if v > pivot_abs {
                pivot_row = r;
                pivot_abs = v;
            }
        }

        if pivot_abs.is_nan() || pivot_abs < tol {
            continue;
        }
        has_pivot[col] = true;

        if pivot_row != col {
            m.swap_rows(col, pivot_row);
            rhs.swap_rows(col, pivot_row);
        }

        let pivot = m[(col, col)];
        for r in (col + 1)..n {
            let f = m[(r, col)] / pivot;
            if f == 0.0 {
                continue;
            }
            m[(r, col)] = 0.0;
            for c in (col + 1)..n {
                m[(r, c)] -= f * m[(col, c)];
            }
            rhs[r] -= f * rhs[col];
        }
    }

    let mut x = DVector::<f64>::zeros(n);
    for i in (0..n).rev() {
        if !has_pivot[i] {
            continue;
        }
        let mut acc = rhs[i];
        for j in (i + 1)..n {
            acc -= m[(i, j)] * x[j];
        }
        x[i] = acc / m[(i, i)];
    }

    let deficient = has_pivot
        .iter()
        .enumerate()
        .filter_map(|(i, &ok)| (!ok).then_some(i))
        .collect();

    Ok(LinearSolution { x, deficient })
}

/// Least-squares solve of `a * x ≈ b`.
///
/// Square systems are solved directly; overdetermined ones through the
/// normal equations `AᵗA x = Aᵗb`.
pub fn solve_least_squares(
    a: &DMatrix<f64>,
    b: &DVector<f64>,
    tolerance: f64,
) -> Result<LinearSolution, LinearSolveError> {
    let (rows, cols) = a.shape();
    if b.len() != rows {
        return Err(LinearSolveError::DimensionMismatch {
            rows,
            cols,
            rhs: b.len(),
        });
    }
    if rows < cols {
        return Err(LinearSolveError::Underdetermined { rows, cols });
    }
    if rows == cols {
        return solve_gaussian(a, b, tolerance);
    }

    let at = a.transpose();
    let ata = &at * a;
    let atb = &at * b;
    solve_gaussian(&ata, &atb, tolerance)
}
