//! Linear Algebra Kernel for 4-Feature Readings
//!
//! ## Overview
//!
//! Both detectors work in the same four-dimensional feature space
//! (temperature, humidity, light, voltage). This module holds the stateless
//! math they share; it owns no data and keeps nothing between calls.
//!
//! ## Mahalanobis Distance
//!
//! ```text
//! d = sqrt( (x - μ)ᵀ × Σ⁻¹ × (x - μ) )
//!
//! Where:
//! - x = reading feature vector
//! - μ = window mean
//! - Σ = window sample covariance (+ ridge on the diagonal)
//! ```
//!
//! Rounding can push the quadratic form slightly below zero for points at
//! the mean; it is clamped to zero before the square root.
//!
//! ## Covariance
//!
//! Sample covariance with Bessel's correction (divide by N - 1). A constant
//! channel gives a zero row and column, so a small ridge
//! ([`COVARIANCE_REGULARIZATION`]) is added to every diagonal entry.
//!
//! ## Inversion
//!
//! Gauss-Jordan elimination on `[Σ | I]` with partial pivoting: before
//! eliminating column `i`, the row with the largest magnitude in that column
//! is swapped into position `i`. A pivot smaller than [`PIVOT_TOLERANCE`]
//! aborts with [`DetectionError::SingularMatrix`].
//!
//! ## Cost
//!
//! | Operation    | Flops (approx.) |
//! |--------------|-----------------|
//! | mean         | 4N              |
//! | covariance   | 32N             |
//! | invert4x4    | ~400            |
//! | mahalanobis  | 40              |
//!
//! On a MICA2 without FPU the whole snapshot is charged as
//! [`MAHALANOBIS_OPERATIONS`](crate::constants::detection::MAHALANOBIS_OPERATIONS).

use crate::constants::{COVARIANCE_REGULARIZATION, FEATURE_COUNT, PIVOT_TOLERANCE};
use crate::errors::{DetectionError, DetectionResult};

/// Feature vector `[T, H, L, V]`
pub type Vector4 = [f64; FEATURE_COUNT];

/// Row-major 4x4 matrix
pub type Matrix4 = [[f64; FEATURE_COUNT]; FEATURE_COUNT];

/// The 4x4 identity
pub const IDENTITY: Matrix4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Per-column arithmetic mean
///
/// Fails with `InsufficientData` on an empty slice.
pub fn mean(rows: &[Vector4]) -> DetectionResult<Vector4> {
    if rows.is_empty() {
        return Err(DetectionError::InsufficientData { required: 1, available: 0 });
    }

    let mut mean = [0.0; FEATURE_COUNT];
    for row in rows {
        for (acc, value) in mean.iter_mut().zip(row) {
            *acc += value;
        }
    }

    let n = rows.len() as f64;
    for acc in &mut mean {
        *acc /= n;
    }
    Ok(mean)
}

/// Sample covariance (N - 1) plus `regularization` on the diagonal
///
/// Needs at least two rows.
pub fn covariance(
    rows: &[Vector4],
    mean: &Vector4,
    regularization: f64,
) -> DetectionResult<Matrix4> {
    if rows.len() < 2 {
        return Err(DetectionError::InsufficientData { required: 2, available: rows.len() });
    }

    let mut cov = [[0.0; FEATURE_COUNT]; FEATURE_COUNT];
    for row in rows {
        let diff = sub(row, mean);
        for j in 0..FEATURE_COUNT {
            for k in 0..FEATURE_COUNT {
                cov[j][k] += diff[j] * diff[k];
            }
        }
    }

    let denominator = (rows.len() - 1) as f64;
    for (j, cov_row) in cov.iter_mut().enumerate() {
        for entry in cov_row.iter_mut() {
            *entry /= denominator;
        }
        cov_row[j] += regularization;
    }
    Ok(cov)
}

/// Invert a 4x4 matrix by Gauss-Jordan elimination with partial pivoting
pub fn invert4x4(matrix: &Matrix4) -> DetectionResult<Matrix4> {
    let mut aug = *matrix;
    let mut inverse = IDENTITY;

    for i in 0..FEATURE_COUNT {
        // Partial pivoting: largest magnitude in column i at or below row i
        let mut max_row = i;
        for k in (i + 1)..FEATURE_COUNT {
            if libm::fabs(aug[k][i]) > libm::fabs(aug[max_row][i]) {
                max_row = k;
            }
        }
        aug.swap(i, max_row);
        inverse.swap(i, max_row);

        let pivot = aug[i][i];
        if libm::fabs(pivot) < PIVOT_TOLERANCE {
            return Err(DetectionError::SingularMatrix { pivot: libm::fabs(pivot) });
        }

        for j in 0..FEATURE_COUNT {
            aug[i][j] /= pivot;
            inverse[i][j] /= pivot;
        }

        for k in 0..FEATURE_COUNT {
            if k == i {
                continue;
            }
            let factor = aug[k][i];
            for j in 0..FEATURE_COUNT {
                aug[k][j] -= factor * aug[i][j];
                inverse[k][j] -= factor * inverse[i][j];
            }
        }
    }

    Ok(inverse)
}

/// Mahalanobis distance of `sample` from `mean` under `inv_cov`
pub fn mahalanobis(sample: &Vector4, mean: &Vector4, inv_cov: &Matrix4) -> f64 {
    let diff = sub(sample, mean);

    let mut squared = 0.0;
    for i in 0..FEATURE_COUNT {
        let mut projected = 0.0;
        for j in 0..FEATURE_COUNT {
            projected += diff[j] * inv_cov[j][i];
        }
        squared += projected * diff[i];
    }

    libm::sqrt(squared.max(0.0))
}

/// Euclidean distance between two feature vectors
pub fn euclidean(sample: &Vector4, center: &Vector4) -> f64 {
    let squared: f64 = sub(sample, center).iter().map(|d| d * d).sum();
    libm::sqrt(squared)
}

fn sub(a: &Vector4, b: &Vector4) -> Vector4 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2], a[3] - b[3]]
}

/// Mean, covariance and inverse of one window
///
/// Computed from scratch on every trigger and dropped afterwards; nothing is
/// updated incrementally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    /// Window mean
    pub mean: Vector4,
    /// Regularized sample covariance
    pub covariance: Matrix4,
    /// Inverse of `covariance`
    pub inverse: Matrix4,
}

impl Statistics {
    /// Compute the full snapshot for `rows`
    ///
    /// Singular covariance surfaces as `SingularMatrix`; callers decide how to
    /// degrade.
    pub fn compute(rows: &[Vector4], regularization: f64) -> DetectionResult<Self> {
        let mean = mean(rows)?;
        let covariance = covariance(rows, &mean, regularization)?;
        let inverse = invert4x4(&covariance)?;
        Ok(Self { mean, covariance, inverse })
    }

    /// Snapshot with the default ridge
    pub fn with_default_regularization(rows: &[Vector4]) -> DetectionResult<Self> {
        Self::compute(rows, COVARIANCE_REGULARIZATION)
    }

    /// Mahalanobis distance of `sample` from this window
    pub fn distance(&self, sample: &Vector4) -> f64 {
        mahalanobis(sample, &self.mean, &self.inverse)
    }

    /// Diagonal of the covariance (per-channel variance)
    pub fn variances(&self) -> Vector4 {
        [
            self.covariance[0][0],
            self.covariance[1][1],
            self.covariance[2][2],
            self.covariance[3][3],
        ]
    }
}
