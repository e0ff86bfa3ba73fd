//! Error Types for the Detection Path
//!
//! ## Design Philosophy
//!
//! The cluster head must keep forwarding data no matter what the statistics
//! look like, so very few of these errors ever reach a caller:
//!
//! 1. **Small Size**: variants carry only numbers and `&'static str`, the enum
//!    is `Copy` and cheap to return from the kernel hot path.
//!
//! 2. **Absorbed, Not Raised**: a singular covariance is an expected outcome on
//!    small windows. Detectors catch [`DetectionError::SingularMatrix`] and turn
//!    it into an unclassified pass-through.
//!
//! 3. **Invariant Violations Stay Visible**: [`DetectionError::InsufficientData`]
//!    only appears when a trigger fires with fewer rows than the statistics
//!    need, which the fixed trigger size (≥2) rules out.
//!
//! ## Error Categories
//!
//! ### Numerical
//! - `SingularMatrix`: a Gauss-Jordan pivot fell below the tolerance
//! - `InsufficientData`: mean needs 1 row, covariance needs 2
//!
//! ### Configuration
//! - `InvalidConfig`: rejected by [`EngineConfig::validate`](crate::EngineConfig::validate)
//! - `InvalidValue`: a non-finite number where a finite one is required
//!
//! ## Handling Strategy
//!
//! ```rust
//! use clusterguard_core::kernel::{invert4x4, Matrix4};
//! use clusterguard_core::DetectionError;
//!
//! match invert4x4(&Matrix4::default()) {
//!     Ok(_inverse) => {
//!         // Classify the window
//!     }
//!     Err(DetectionError::SingularMatrix { .. }) => {
//!         // Forward the readings unclassified
//!     }
//!     Err(_) => {
//!         // Programming error - log and investigate
//!     }
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for detection operations
pub type DetectionResult<T> = Result<T, DetectionError>;

/// Detection errors - kept small and `Copy`
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum DetectionError {
    /// Gauss-Jordan elimination met a pivot too close to zero
    #[error("Singular matrix: pivot {pivot} below tolerance")]
    SingularMatrix {
        /// Magnitude of the offending pivot
        pivot: f64,
    },

    /// Not enough rows for the requested statistic
    #[error("Insufficient data: need {required}, have {available}")]
    InsufficientData {
        /// Minimum number of rows needed
        required: usize,
        /// Actual number of rows supplied
        available: usize,
    },

    /// Configuration rejected before the engine was built
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// Which constraint was broken
        reason: &'static str,
    },

    /// Value makes no numerical sense (NaN, infinity)
    #[error("Invalid value: not a finite number")]
    InvalidValue,
}

#[cfg(feature = "defmt")]
impl defmt::Format for DetectionError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::SingularMatrix { pivot } =>
                defmt::write!(fmt, "Singular matrix (pivot {})", pivot),
            Self::InsufficientData { required, available } =>
                defmt::write!(fmt, "Need {} rows, have {}", required, available),
            Self::InvalidConfig { reason } =>
                defmt::write!(fmt, "Invalid config: {}", reason),
            Self::InvalidValue =>
                defmt::write!(fmt, "Invalid value"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_are_copy_and_comparable() {
        let err = DetectionError::InsufficientData { required: 2, available: 1 };
        let copy = err;
        assert_eq!(err, copy);
    }

    #[cfg(feature = "std")]
    #[test]
    fn error_messages_render() {
        let err = DetectionError::InvalidConfig { reason: "window size must be at least 2" };
        assert_eq!(
            err.to_string(),
            "Invalid configuration: window size must be at least 2"
        );
    }
}
