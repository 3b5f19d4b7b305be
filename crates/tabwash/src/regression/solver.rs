//! Dense linear-algebra helpers for the regression fits.

use ndarray::{Array1, Array2};

/// Relative pivot size below which a matrix is treated as singular.
const SINGULARITY_EPSILON: f64 = 1e-12;

/// Design matrix with a leading column of ones.
pub fn design_matrix(rows: &[Vec<f64>]) -> Array2<f64> {
    let n = rows.len();
    let p = rows.first().map_or(0, Vec::len);
    let mut x = Array2::ones((n, p + 1));
    for (i, row) in rows.iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            x[[i, j + 1]] = *value;
        }
    }
    x
}

/// Solve `a · w = b` by Gauss-Jordan elimination with partial pivoting.
///
/// Returns `None` when a pivot is negligible relative to the largest entry
/// of `a`.
pub fn solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    if n != a.ncols() || n != b.len() {
        return None;
    }

    let scale = a.iter().fold(0.0f64, |acc, v| acc.max(v.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return None;
    }

    // augmented [A | b]
    let mut aug = Array2::<f64>::zeros((n, n + 1));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = a[[i, j]];
        }
        aug[[i, n]] = b[i];
    }

    for col in 0..n {
        let mut max_row = col;
        for row in col + 1..n {
            if aug[[row, col]].abs() > aug[[max_row, col]].abs() {
                max_row = row;
            }
        }

        if max_row != col {
            for j in 0..=n {
                aug.swap([col, j], [max_row, j]);
            }
        }

        if aug[[col, col]].abs() < SINGULARITY_EPSILON * scale {
            return None;
        }

        let pivot = aug[[col, col]];
        for j in 0..=n {
            aug[[col, j]] /= pivot;
        }

        for row in 0..n {
            if row != col {
                let factor = aug[[row, col]];
                if factor != 0.0 {
                    for j in 0..=n {
                        aug[[row, j]] -= factor * aug[[col, j]];
                    }
                }
            }
        }
    }

    let solution = aug.column(n).to_owned();
    solution.iter().all(|v| v.is_finite()).then_some(solution)
}

/// Ordinary least squares through the normal equations `(XᵀX) w = Xᵀy`.
pub fn least_squares(x: &Array2<f64>, y: &Array1<f64>) -> Option<Array1<f64>> {
    let xtx = x.t().dot(x);
    let xty = x.t().dot(y);
    solve(&xtx, &xty)
}
