const SINGULAR_RELATIVE_PIVOT_EPSILON: f64 = 1.0e-12;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LinearSolveError {
    #[error("linear solve requires a non-empty system")]
    EmptySystem,
    #[error("linear solve requires a square matrix, row {row} has {cols} columns for {rows} rows")]
    NonSquareMatrix { rows: usize, row: usize, cols: usize },
    #[error("right-hand side length mismatch: expected {expected}, got {actual}")]
    RhsLengthMismatch { expected: usize, actual: usize },
    #[error("matrix is singular at pivot index {pivot_index}")]
    SingularMatrix { pivot_index: usize },
}

/// Gaussian elimination with partial pivoting for the small normal-equation
/// systems produced by local polynomial regression.
pub fn solve_linear_system(
    mut matrix: Vec<Vec<f64>>,
    mut rhs: Vec<f64>,
) -> Result<Vec<f64>, LinearSolveError> {
    let dimension = matrix.len();
    if dimension == 0 {
        return Err(LinearSolveError::EmptySystem);
    }
    if let Some((row, cols)) = matrix
        .iter()
        .map(Vec::len)
        .enumerate()
        .find(|(_, cols)| *cols != dimension)
    {
        return Err(LinearSolveError::NonSquareMatrix {
            rows: dimension,
            row,
            cols,
        });
    }
    if rhs.len() != dimension {
        return Err(LinearSolveError::RhsLengthMismatch {
            expected: dimension,
            actual: rhs.len(),
        });
    }

    let scale = matrix
        .iter()
        .flat_map(|row| row.iter())
        .fold(0.0_f64, |acc, value| acc.max(value.abs()));
    let threshold = scale.max(f64::MIN_POSITIVE) * SINGULAR_RELATIVE_PIVOT_EPSILON;

    for pivot_index in 0..dimension {
        let (best_row, best_value) = (pivot_index..dimension)
            .map(|row| (row, matrix[row][pivot_index].abs()))
            .fold((pivot_index, -1.0), |best, candidate| {
                if candidate.1 > best.1 { candidate } else { best }
            });
        if !best_value.is_finite() || best_value <= threshold {
            return Err(LinearSolveError::SingularMatrix { pivot_index });
        }
        matrix.swap(pivot_index, best_row);
        rhs.swap(pivot_index, best_row);

        for row in pivot_index + 1..dimension {
            let factor = matrix[row][pivot_index] / matrix[pivot_index][pivot_index];
            if factor == 0.0 {
                continue;
            }
            for col in pivot_index..dimension {
                matrix[row][col] -= factor * matrix[pivot_index][col];
            }
            rhs[row] -= factor * rhs[pivot_index];
        }
    }

    let mut solution = vec![0.0; dimension];
    for row in (0..dimension).rev() {
        let tail: f64 = (row + 1..dimension)
            .map(|col| matrix[row][col] * solution[col])
            .sum();
        solution[row] = (rhs[row] - tail) / matrix[row][row];
    }

    Ok(solution)
}
