//! Natural cubic spline through a strictly increasing set of knots.
//!
//! Second derivatives are solved once with the tridiagonal (Thomas) sweep and
//! evaluation uses the standard two-point cubic form, so two knots reduce to
//! linear interpolation and collinear knots are reproduced exactly.

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SplineError {
    #[error("spline requires at least one knot")]
    NoKnots,
    #[error("spline knot length mismatch: x={x}, y={y}")]
    LengthMismatch { x: usize, y: usize },
    #[error("spline knots must be finite, index {index} got x={x}, y={y}")]
    NonFiniteKnot { index: usize, x: f64, y: f64 },
    #[error(
        "spline knots must be strictly increasing, index {index} has {current} after {previous}"
    )]
    NonIncreasingKnot {
        index: usize,
        previous: f64,
        current: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct NaturalCubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    second_derivatives: Vec<f64>,
}

impl NaturalCubicSpline {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, SplineError> {
        if x.is_empty() {
            return Err(SplineError::NoKnots);
        }
        if x.len() != y.len() {
            return Err(SplineError::LengthMismatch {
                x: x.len(),
                y: y.len(),
            });
        }
        for (index, (&xi, &yi)) in x.iter().zip(&y).enumerate() {
            if !xi.is_finite() || !yi.is_finite() {
                return Err(SplineError::NonFiniteKnot { index, x: xi, y: yi });
            }
        }
        for index in 1..x.len() {
            if x[index] <= x[index - 1] {
                return Err(SplineError::NonIncreasingKnot {
                    index,
                    previous: x[index - 1],
                    current: x[index],
                });
            }
        }

        let second_derivatives = natural_second_derivatives(&x, &y);
        Ok(Self {
            x,
            y,
            second_derivatives,
        })
    }

    pub fn knots(&self) -> &[f64] {
        &self.x
    }

    pub fn values(&self) -> &[f64] {
        &self.y
    }

    pub fn evaluate(&self, at: f64) -> f64 {
        let count = self.x.len();
        if count == 1 {
            return self.y[0];
        }

        let hi = match self.x.partition_point(|&knot| knot < at) {
            index if index >= count => count - 1,
            0 => 1,
            index => index,
        };
        let lo = hi - 1;

        let span = self.x[hi] - self.x[lo];
        let a = (self.x[hi] - at) / span;
        let b = (at - self.x[lo]) / span;

        a * self.y[lo]
            + b * self.y[hi]
            + (span * span / 6.0)
                * ((a * a * a - a) * self.second_derivatives[lo]
                    + (b * b * b - b) * self.second_derivatives[hi])
    }
}

fn natural_second_derivatives(x: &[f64], y: &[f64]) -> Vec<f64> {
    let count = x.len();
    let mut second = vec![0.0; count];
    if count < 3 {
        return second;
    }

    // Interior unknowns only; natural boundary pins both ends to zero.
    let interior = count - 2;
    let mut diagonal = vec![0.0; interior];
    let mut upper = vec![0.0; interior];
    let mut rhs = vec![0.0; interior];

    for row in 0..interior {
        let index = row + 1;
        let h_left = x[index] - x[index - 1];
        let h_right = x[index + 1] - x[index];
        diagonal[row] = 2.0 * (h_left + h_right);
        upper[row] = h_right;
        rhs[row] =
            6.0 * ((y[index + 1] - y[index]) / h_right - (y[index] - y[index - 1]) / h_left);
    }

    for row in 1..interior {
        let lower = x[row + 1] - x[row];
        let factor = lower / diagonal[row - 1];
        diagonal[row] -= factor * upper[row - 1];
        rhs[row] -= factor * rhs[row - 1];
    }

    let mut solution = vec![0.0; interior];
    for row in (0..interior).rev() {
        let tail = if row + 1 < interior {
            upper[row] * solution[row + 1]
        } else {
            0.0
        };
        solution[row] = (rhs[row] - tail) / diagonal[row];
    }

    second[1..count - 1].copy_from_slice(&solution);
    second
}
