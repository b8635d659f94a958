//! Thin linear-algebra layer over `nalgebra`.
//!
//! The tracker only needs dense multiply, transpose and one inversion per
//! correction. Keeping the builders and the inversion here means the estimator
//! reads in terms of [`Matrix`] and [`Vector`] rather than library details.

use nalgebra::{DMatrix, DVector};

/// Dense, dynamically sized matrix of `f64`
pub type Matrix = DMatrix<f64>;

/// Dense, dynamically sized column vector of `f64`
pub type Vector = DVector<f64>;

/// Build the constant-velocity transition for `positions` position coordinates.
///
/// The result is `2n × 2n`: identity, plus a 1 at `(i, i + n)` so that every
/// position accumulates its paired velocity on each step.
#[must_use]
pub fn constant_velocity_transition(positions: usize) -> Matrix {
    let mut transition = Matrix::identity(2 * positions, 2 * positions);
    for i in 0..positions {
        transition[(i, i + positions)] = 1.0;
    }
    transition
}

/// Build the `n × 2n` observation matrix `[I | 0]` that reads the position half of the state.
#[must_use]
pub fn position_observation(positions: usize) -> Matrix {
    let mut observation = Matrix::zeros(positions, 2 * positions);
    for i in 0..positions {
        observation[(i, i)] = 1.0;
    }
    observation
}

/// Square diagonal matrix with `value` on the diagonal
#[must_use]
pub fn scaled_identity(size: usize, value: f64) -> Matrix {
    Matrix::from_diagonal_element(size, size, value)
}

/// Invert a covariance-like matrix.
///
/// Tries Cholesky first since innovation covariances are symmetric positive
/// definite, then falls back to a general LU inverse. Returns `None` when the
/// matrix is singular or the inverse is not finite.
#[must_use]
pub fn invert(matrix: &Matrix) -> Option<Matrix> {
    if !matrix.is_square() {
        return None;
    }

    if let Some(cholesky) = matrix.clone().cholesky() {
        let inverse = cholesky.inverse();
        if all_finite(inverse.as_slice()) {
            return Some(inverse);
        }
    }

    let inverse = matrix.clone().try_inverse()?;
    all_finite(inverse.as_slice()).then_some(inverse)
}

/// True when every entry is finite
#[must_use]
pub fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}
