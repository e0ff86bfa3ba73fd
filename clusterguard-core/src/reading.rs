//! Sensor readings as seen by the cluster head
//!
//! A [`Reading`] is one measurement round from one mote: four physical
//! channels plus two flags. The ground-truth flag is set by whoever
//! manufactured the data (outlier injection) and exists for scoring only;
//! no detector reads it before its decision is made. The detected flag is
//! written by the engine.
//!
//! ```text
//! Reading layout (40 bytes):
//! ├── features:  4 × 8 bytes (T, H, L, V)
//! ├── source_id: 4 bytes
//! ├── ground_truth_outlier: 1 byte
//! ├── detected_outlier: 1 byte
//! └── padding: 2 bytes
//! ```

use core::fmt;

use crate::constants::FEATURE_COUNT;
use crate::kernel::Vector4;

/// Mote identifier
pub type SourceId = u32;

/// One sensor reading
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reading {
    /// Mote that measured the reading
    pub source_id: SourceId,
    /// Temperature (°C)
    pub temperature: f64,
    /// Relative humidity (%)
    pub humidity: f64,
    /// Light (lux)
    pub light: f64,
    /// Supply voltage (V)
    pub voltage: f64,
    /// Injected outlier marker, evaluation only
    #[cfg_attr(feature = "serde", serde(default))]
    pub ground_truth_outlier: bool,
    /// Set by the engine once the reading has been classified
    #[cfg_attr(feature = "serde", serde(default))]
    pub detected_outlier: bool,
}

impl Reading {
    /// Create a normal (not injected) reading
    pub const fn new(
        source_id: SourceId,
        temperature: f64,
        humidity: f64,
        light: f64,
        voltage: f64,
    ) -> Self {
        Self {
            source_id,
            temperature,
            humidity,
            light,
            voltage,
            ground_truth_outlier: false,
            detected_outlier: false,
        }
    }

    /// Build a reading from a feature vector
    pub const fn from_features(source_id: SourceId, features: Vector4) -> Self {
        Self::new(source_id, features[0], features[1], features[2], features[3])
    }

    /// Mark the reading as an injected outlier
    pub const fn with_ground_truth(mut self, outlier: bool) -> Self {
        self.ground_truth_outlier = outlier;
        self
    }

    /// Feature vector `[T, H, L, V]`
    pub const fn features(&self) -> Vector4 {
        [self.temperature, self.humidity, self.light, self.voltage]
    }

    /// Whether every channel holds a finite number
    pub fn is_finite(&self) -> bool {
        self.features().iter().all(|v| v.is_finite())
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Node {} | T={:.2} H={:.2} L={:.2} V={:.3}",
            self.source_id, self.temperature, self.humidity, self.light, self.voltage
        )
    }
}

/// Names of the feature channels, in vector order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = ["temperature", "humidity", "light", "voltage"];
