//! Detection Constants
//!
//! Defaults and tolerances for the ODA-MD and OD detectors.

// ===== FEATURE SPACE =====

/// Number of features per reading: temperature, humidity, light, voltage.
pub const FEATURE_COUNT: usize = 4;

// ===== ODA-MD =====

/// Default Mahalanobis cutoff for ODA-MD.
///
/// sqrt(χ²₄(0.75)) ≈ 2.27 is too eager on 20-sample windows; 3.338 is the
/// cutoff used on the Intel Berkeley Lab deployment.
pub const DEFAULT_ODAMD_THRESHOLD: f64 = 3.338;

/// Default sliding window capacity (readings).
///
/// Also the OD batch size. Three motes at one reading per round fill a window
/// in seven request rounds.
pub const DEFAULT_WINDOW_SIZE: usize = 20;

/// Smallest window for which a sample covariance exists (Bessel: N - 1 > 0).
pub const MIN_WINDOW_SIZE: usize = 2;

/// Ridge added to every covariance diagonal entry.
///
/// Keeps constant-valued channels (voltage often is) invertible.
pub const COVARIANCE_REGULARIZATION: f64 = 0.001;

/// Gauss-Jordan pivots with a smaller magnitude mark the matrix singular.
pub const PIVOT_TOLERANCE: f64 = 1e-9;

/// CPU operations charged for one covariance inversion plus distances.
///
/// A 4x4 Gauss-Jordan with partial pivoting is ~1000 floating-point ops.
pub const MAHALANOBIS_OPERATIONS: u32 = 1000;

// ===== OD =====

/// Default minimum cluster score for OD (Euclidean units).
pub const DEFAULT_OD_THRESHOLD: f64 = 15.0;

/// Default fixed-width cluster radius (Euclidean units).
pub const DEFAULT_CLUSTER_WIDTH: f64 = 50.0;

/// CPU operations charged for one clustering pass.
pub const CLUSTERING_OPERATIONS: u32 = 100;

/// Standard deviations above the mean a cluster score must exceed.
pub const SCORE_STDDEV_FACTOR: f64 = 1.0;
