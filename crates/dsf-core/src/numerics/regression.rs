//! Running local polynomial regression along a sorted abscissa.
//!
//! Every knot is replaced by the value of a least-squares polynomial fitted to
//! the `window` knots nearest to it (by index), evaluated at the knot itself.
//! The spread of the residuals becomes the knot's error estimate.

use super::linalg::{LinearSolveError, solve_linear_system};
use crate::domain::RegressionType;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegressionError {
    #[error("running regression requires at least one point")]
    EmptyInput,
    #[error("running regression input length mismatch: x={x}, y={y}")]
    LengthMismatch { x: usize, y: usize },
    #[error("running regression error length mismatch: expected {expected}, got {actual}")]
    ErrorLengthMismatch { expected: usize, actual: usize },
    #[error("running regression window must be positive")]
    ZeroWindow,
    #[error("local fit at index {index} failed: {source}")]
    LocalFit {
        index: usize,
        source: LinearSolveError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningRegressionInput<'a> {
    pub x: &'a [f64],
    pub y: &'a [f64],
    pub errors: Option<&'a [f64]>,
    pub regression: RegressionType,
    pub window: usize,
}

impl<'a> RunningRegressionInput<'a> {
    pub fn new(
        x: &'a [f64],
        y: &'a [f64],
        errors: Option<&'a [f64]>,
        regression: RegressionType,
        window: usize,
    ) -> Self {
        Self {
            x,
            y,
            errors,
            regression,
            window,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFit {
    pub value: f64,
    pub error: f64,
}

pub fn running_regression(
    input: RunningRegressionInput<'_>,
) -> Result<Vec<LocalFit>, RegressionError> {
    let count = input.x.len();
    if count == 0 {
        return Err(RegressionError::EmptyInput);
    }
    if input.y.len() != count {
        return Err(RegressionError::LengthMismatch {
            x: count,
            y: input.y.len(),
        });
    }
    if let Some(errors) = input.errors {
        if errors.len() != count {
            return Err(RegressionError::ErrorLengthMismatch {
                expected: count,
                actual: errors.len(),
            });
        }
    }
    if input.window == 0 {
        return Err(RegressionError::ZeroWindow);
    }

    let window = input.window.min(count);
    let degree = input.regression.polynomial_degree();

    (0..count)
        .map(|index| -> Result<LocalFit, RegressionError> {
            let start = index.saturating_sub(window / 2).min(count - window);
            let range = start..start + window;
            let weights =
                window_weights(window, input.errors.map(|errors| &errors[range.clone()]));
            let fit = fit_local_polynomial(
                &input.x[range.clone()],
                &input.y[range],
                &weights,
                input.x[index],
                degree,
            )
            .map_err(|source| RegressionError::LocalFit { index, source })?;

            let error = match fit.residual_std {
                Some(spread) => spread,
                None => input
                    .errors
                    .map(|errors| errors[index])
                    .unwrap_or(0.0),
            };
            Ok(LocalFit {
                value: fit.value,
                error,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolynomialFit {
    pub value: f64,
    pub degree: usize,
    /// `None` when the fit is exactly determined.
    pub residual_std: Option<f64>,
}

/// Weighted least-squares polynomial in `(x - center)`, evaluated at `center`.
///
/// The degree is lowered until the normal equations are solvable or the
/// window has fewer points than coefficients.
pub fn fit_local_polynomial(
    x: &[f64],
    y: &[f64],
    weights: &[f64],
    center: f64,
    degree: usize,
) -> Result<PolynomialFit, LinearSolveError> {
    let points = x.len();
    if points == 0 {
        return Err(LinearSolveError::EmptySystem);
    }
    let mut degree = degree.min(points - 1);

    loop {
        match solve_normal_equations(x, y, weights, center, degree) {
            Ok(coefficients) => {
                let terms = degree + 1;
                let residual_std = (points > terms).then(|| {
                    let sum_sq: f64 = x
                        .iter()
                        .zip(y)
                        .map(|(&xi, &yi)| {
                            let residual = yi - evaluate_polynomial(&coefficients, xi - center);
                            residual * residual
                        })
                        .sum();
                    (sum_sq / (points - terms) as f64).sqrt()
                });
                return Ok(PolynomialFit {
                    value: coefficients[0],
                    degree,
                    residual_std,
                });
            }
            Err(LinearSolveError::SingularMatrix { .. }) if degree > 0 => degree -= 1,
            Err(error) => return Err(error),
        }
    }
}

fn solve_normal_equations(
    x: &[f64],
    y: &[f64],
    weights: &[f64],
    center: f64,
    degree: usize,
) -> Result<Vec<f64>, LinearSolveError> {
    let terms = degree + 1;
    let mut moments = vec![0.0; 2 * degree + 1];
    let mut rhs = vec![0.0; terms];

    for ((&xi, &yi), &weight) in x.iter().zip(y).zip(weights) {
        let offset = xi - center;
        let mut power = weight;
        for (order, moment) in moments.iter_mut().enumerate() {
            *moment += power;
            if order < terms {
                rhs[order] += power * yi;
            }
            power *= offset;
        }
    }

    let matrix = (0..terms)
        .map(|row| (0..terms).map(|col| moments[row + col]).collect())
        .collect();
    solve_linear_system(matrix, rhs)
}

fn evaluate_polynomial(coefficients: &[f64], offset: f64) -> f64 {
    coefficients
        .iter()
        .rev()
        .fold(0.0, |acc, coefficient| acc * offset + coefficient)
}

fn window_weights(window: usize, errors: Option<&[f64]>) -> Vec<f64> {
    match errors {
        Some(errors) if errors.iter().all(|e| e.is_finite() && *e > 0.0) => {
            errors.iter().map(|e| 1.0 / (e * e)).collect()
        }
        _ => vec![1.0; window],
    }
}
