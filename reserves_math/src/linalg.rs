//! Small dense linear algebra used by the surface fits

use crate::{MathError, Result};

const PIVOT_TOLERANCE: f64 = 1e-12;

/// Solve `A x = b` by Gaussian elimination with partial pivoting.
///
/// `matrix` is row-major `n x n` and is consumed along with `rhs`.
pub fn gauss_solve(n: usize, mut matrix: Vec<f64>, mut rhs: Vec<f64>) -> Result<Vec<f64>> {
    if matrix.len() != n * n || rhs.len() != n {
        return Err(MathError::InvalidInput(format!(
            "Expected a {n}x{n} system, got {} matrix entries and {} right-hand values",
            matrix.len(),
            rhs.len()
        )));
    }

    let scale = matrix.iter().fold(0.0_f64, |acc, v| acc.max(v.abs())).max(1.0);

    for col in 0..n {
        let mut pivot_row = col;
        let mut pivot_abs = matrix[col * n + col].abs();
        for row in (col + 1)..n {
            let candidate = matrix[row * n + col].abs();
            if candidate > pivot_abs {
                pivot_abs = candidate;
                pivot_row = row;
            }
        }

        if pivot_abs <= PIVOT_TOLERANCE * scale || !pivot_abs.is_finite() {
            return Err(MathError::SingularSystem(format!(
                "No usable pivot in column {col}"
            )));
        }

        if pivot_row != col {
            for j in 0..n {
                matrix.swap(col * n + j, pivot_row * n + j);
            }
            rhs.swap(col, pivot_row);
        }

        let pivot = matrix[col * n + col];
        for row in (col + 1)..n {
            let factor = matrix[row * n + col] / pivot;
            matrix[row * n + col] = 0.0;
            for j in (col + 1)..n {
                matrix[row * n + j] -= factor * matrix[col * n + j];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut solution = vec![0.0_f64; n];
    for col in (0..n).rev() {
        let mut sum = rhs[col];
        for j in (col + 1)..n {
            sum -= matrix[col * n + j] * solution[j];
        }
        solution[col] = sum / matrix[col * n + col];
    }

    Ok(solution)
}

/// Least-squares solution of an overdetermined system via the normal equations.
///
/// Each entry of `rows` is one equation's coefficients; all rows must have
/// the same width.
pub fn least_squares(rows: &[Vec<f64>], rhs: &[f64]) -> Result<Vec<f64>> {
    let width = rows.first().map(Vec::len).unwrap_or(0);
    if width == 0 || rows.len() != rhs.len() {
        return Err(MathError::InvalidInput(
            "Least squares needs a non-empty design matrix matching the right-hand side"
                .to_string(),
        ));
    }
    if rows.len() < width {
        return Err(MathError::InsufficientData(format!(
            "Least squares with {width} unknowns needs at least {width} equations, got {}",
            rows.len()
        )));
    }
    if rows.iter().any(|row| row.len() != width) {
        return Err(MathError::InvalidInput(
            "Design matrix rows have different widths".to_string(),
        ));
    }

    let mut normal = vec![0.0_f64; width * width];
    let mut projected = vec![0.0_f64; width];
    for (row, &target) in rows.iter().zip(rhs.iter()) {
        for i in 0..width {
            projected[i] += row[i] * target;
            for j in 0..width {
                normal[i * width + j] += row[i] * row[j];
            }
        }
    }

    gauss_solve(width, normal, projected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gauss_solve_with_pivoting() {
        // First pivot is zero, forcing a row swap
        let matrix = vec![0.0, 2.0, 1.0, 1.0, 1.0, 1.0, 2.0, 1.0, 3.0];
        let rhs = vec![5.0, 5.0, 12.0];

        let x = gauss_solve(3, matrix, rhs).unwrap();
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[2], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_system() {
        let matrix = vec![1.0, 2.0, 2.0, 4.0];
        assert!(matches!(
            gauss_solve(2, matrix, vec![1.0, 2.0]),
            Err(MathError::SingularSystem(_))
        ));
    }

    #[test]
    fn test_least_squares_line() {
        // y = 1 + 2x with symmetric noise
        let rows: Vec<Vec<f64>> = (0..4).map(|i| vec![1.0, i as f64]).collect();
        let rhs = [1.1, 2.9, 5.1, 6.9];

        let coef = least_squares(&rows, &rhs).unwrap();
        assert_relative_eq!(coef[0], 1.06, epsilon = 1e-9);
        assert_relative_eq!(coef[1], 1.96, epsilon = 1e-9);
    }

    #[test]
    fn test_least_squares_underdetermined() {
        let rows = vec![vec![1.0, 2.0]];
        assert!(matches!(
            least_squares(&rows, &[1.0]),
            Err(MathError::InsufficientData(_))
        ));
    }
}
