//! Engine configuration
//!
//! Thresholds, window size and timer intervals are supplied from outside
//! (a JSON file in the simulator). Defaults match the Intel Berkeley Lab
//! deployment.
//!
//! ```rust
//! use clusterguard_core::{Algorithm, EngineConfig};
//!
//! let config = EngineConfig::od()
//!     .with_window_size(30)
//!     .with_cluster_width(40.0);
//!
//! assert_eq!(config.algorithm, Algorithm::Od);
//! assert!(config.validate().is_ok());
//! ```

use core::fmt;

use crate::constants::detection::{
    COVARIANCE_REGULARIZATION, DEFAULT_CLUSTER_WIDTH, DEFAULT_OD_THRESHOLD,
    DEFAULT_ODAMD_THRESHOLD, DEFAULT_WINDOW_SIZE, MIN_WINDOW_SIZE,
};
use crate::constants::energy::{CLUSTER_HEAD_ENERGY_J, DATA_PACKET_BITS, FORWARD_DISTANCE_M};
use crate::constants::time::{DEFAULT_LOG_INTERVAL, DEFAULT_REQUEST_INTERVAL};
use crate::errors::{DetectionError, DetectionResult};

/// Detection algorithm run by the cluster head
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Algorithm {
    /// Sliding-window Mahalanobis detector
    #[default]
    #[cfg_attr(feature = "serde", serde(rename = "ODA-MD", alias = "odamd", alias = "oda-md"))]
    OdaMd,
    /// Fixed-width clustering detector
    #[cfg_attr(feature = "serde", serde(rename = "OD", alias = "od"))]
    Od,
}

impl Algorithm {
    /// Display name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::OdaMd => "ODA-MD",
            Self::Od => "OD",
        }
    }

    /// Distance cutoff used when none is configured
    pub const fn default_threshold(&self) -> f64 {
        match self {
            Self::OdaMd => DEFAULT_ODAMD_THRESHOLD,
            Self::Od => DEFAULT_OD_THRESHOLD,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl core::str::FromStr for Algorithm {
    type Err = DetectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ODA-MD" | "oda-md" | "odamd" | "ODAMD" => Ok(Self::OdaMd),
            "OD" | "od" => Ok(Self::Od),
            _ => Err(DetectionError::InvalidConfig { reason: "unknown algorithm" }),
        }
    }
}

/// Cluster head configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Active detector
    pub algorithm: Algorithm,
    /// Distance cutoff (Mahalanobis for ODA-MD, cluster score for OD)
    pub threshold: f64,
    /// Sliding window capacity (ODA-MD) or batch size (OD)
    pub window_size: usize,
    /// Fixed-width cluster radius (OD only)
    pub cluster_width: f64,
    /// Interval between metrics log entries
    pub log_interval: f64,
    /// Interval between pull request rounds
    pub request_interval: f64,
    /// Ridge added to the covariance diagonal (ODA-MD only)
    pub regularization: f64,
    /// Cluster head battery budget (J)
    pub initial_energy: f64,
    /// Size of one data packet (bits)
    pub packet_bits: u32,
    /// Distance to the sink for forwarded readings (m)
    pub forward_distance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::odamd()
    }
}

impl EngineConfig {
    /// ODA-MD with its default threshold
    pub fn odamd() -> Self {
        Self::for_algorithm(Algorithm::OdaMd)
    }

    /// OD with its default threshold
    pub fn od() -> Self {
        Self::for_algorithm(Algorithm::Od)
    }

    /// Defaults for `algorithm`
    pub fn for_algorithm(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            threshold: algorithm.default_threshold(),
            window_size: DEFAULT_WINDOW_SIZE,
            cluster_width: DEFAULT_CLUSTER_WIDTH,
            log_interval: DEFAULT_LOG_INTERVAL,
            request_interval: DEFAULT_REQUEST_INTERVAL,
            regularization: COVARIANCE_REGULARIZATION,
            initial_energy: CLUSTER_HEAD_ENERGY_J,
            packet_bits: DATA_PACKET_BITS,
            forward_distance: FORWARD_DISTANCE_M,
        }
    }

    /// Set the distance cutoff
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the window (or batch) size
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Set the cluster radius
    pub fn with_cluster_width(mut self, cluster_width: f64) -> Self {
        self.cluster_width = cluster_width;
        self
    }

    /// Set the metrics log interval
    pub fn with_log_interval(mut self, log_interval: f64) -> Self {
        self.log_interval = log_interval;
        self
    }

    /// Set the pull request interval
    pub fn with_request_interval(mut self, request_interval: f64) -> Self {
        self.request_interval = request_interval;
        self
    }

    /// Set the covariance ridge
    pub fn with_regularization(mut self, regularization: f64) -> Self {
        self.regularization = regularization;
        self
    }

    /// Set the battery budget
    pub fn with_initial_energy(mut self, initial_energy: f64) -> Self {
        self.initial_energy = initial_energy;
        self
    }

    /// Reject configurations the detectors cannot run with
    pub fn validate(&self) -> DetectionResult<()> {
        if self.window_size < MIN_WINDOW_SIZE {
            return Err(DetectionError::InvalidConfig {
                reason: "window size must be at least 2",
            });
        }
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(DetectionError::InvalidConfig { reason: "threshold must be positive" });
        }
        if self.algorithm == Algorithm::Od
            && (!self.cluster_width.is_finite() || self.cluster_width <= 0.0)
        {
            return Err(DetectionError::InvalidConfig {
                reason: "cluster width must be positive",
            });
        }
        if !(self.log_interval > 0.0) || !(self.request_interval > 0.0) {
            return Err(DetectionError::InvalidConfig { reason: "timer intervals must be positive" });
        }
        if !self.regularization.is_finite() || self.regularization < 0.0 {
            return Err(DetectionError::InvalidConfig {
                reason: "regularization must be non-negative",
            });
        }
        if !self.initial_energy.is_finite() || self.initial_energy < 0.0 {
            return Err(DetectionError::InvalidConfig {
                reason: "initial energy must be non-negative",
            });
        }
        if !self.forward_distance.is_finite() || self.forward_distance < 0.0 {
            return Err(DetectionError::InvalidValue);
        }
        Ok(())
    }
}
