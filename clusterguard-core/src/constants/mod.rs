//! Constants for ClusterGuard Core
//!
//! Every numeric value the engine relies on lives here, with its unit and
//! where it comes from. Detectors and the energy model read these instead of
//! embedding magic numbers.
//!
//! ## Organization
//!
//! - **Detection**: thresholds, window sizes, numerical tolerances
//! - **Energy**: first-order radio model coefficients and packet sizes
//! - **Time**: timer intervals and processor timing
//! - **Quality**: trust tiers for source reliability reporting

/// Detection thresholds, window defaults and numerical tolerances.
pub mod detection;

/// Radio and CPU energy coefficients (Heinzelman first-order model).
pub mod energy;

/// Timer intervals and processor timing.
pub mod time;

/// Trust tiers for per-source reliability.
pub mod quality;

// Re-export commonly used constants for convenience
pub use detection::{
    DEFAULT_CLUSTER_WIDTH, DEFAULT_OD_THRESHOLD, DEFAULT_ODAMD_THRESHOLD, DEFAULT_WINDOW_SIZE,
    FEATURE_COUNT, COVARIANCE_REGULARIZATION, PIVOT_TOLERANCE, MAHALANOBIS_OPERATIONS,
    CLUSTERING_OPERATIONS,
};

pub use energy::{
    E_AMP_J_PER_BIT_M2, E_DA_J_PER_BIT, E_ELEC_J_PER_BIT, E_MP_J_PER_BIT_M4, E_OP_J_PER_OP,
    CROSSOVER_DISTANCE_M, DATA_PACKET_BITS, CONTROL_PACKET_BITS, FORWARD_DISTANCE_M,
    MEMBER_DISTANCE_M, CLUSTER_HEAD_ENERGY_J, SENSOR_NODE_ENERGY_J,
};

pub use time::{DEFAULT_LOG_INTERVAL, DEFAULT_REQUEST_INTERVAL};

pub use quality::{TRUST_MODERATE, TRUST_RELIABLE, TRUST_UNSEEN};
