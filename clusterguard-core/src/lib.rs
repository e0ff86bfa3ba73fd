//! Core detection engine for ClusterGuard
//!
//! Runs on a sensor-network cluster head: readings arrive from member nodes,
//! get classified as normal or outlier, and only the normal ones travel on to
//! the sink. Two detectors share one linear-algebra kernel:
//!
//! - **ODA-MD**: sliding window, covariance estimate, Mahalanobis threshold
//! - **OD**: fixed-width clustering with inter-cluster scoring and per-source trust
//!
//! Key constraints:
//! - Single-threaded, every handler runs to completion
//! - No singular-matrix fault ever leaves the detection path
//! - Energy is charged per bit and per operation, never refused
//!
//! ```no_run
//! use clusterguard_core::{ClusterHead, EngineConfig, Reading};
//!
//! let mut head = ClusterHead::new(EngineConfig::odamd()).unwrap();
//!
//! let reading = Reading::new(36, 22.4, 38.1, 310.0, 2.61);
//! for forwarded in head.handle_reading(reading) {
//!     // hand over to the sink
//!     let _ = forwarded;
//! }
//!
//! let report = head.shutdown(1_000.0);
//! println!("{}", report);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[macro_use]
mod macros;

pub mod buffer;
pub mod config;
pub mod constants;
pub mod detector;
pub mod energy;
pub mod engine;
pub mod errors;
pub mod kernel;
pub mod metrics;
pub mod reading;
pub mod request;
pub mod time;
pub mod trust;

// Public API
pub use config::{Algorithm, EngineConfig};
pub use detector::{
    ClusteringDetector, Detector, DetectionSink, OutlierDetector, SlidingWindowDetector,
};
pub use energy::EnergyAccountant;
pub use engine::{ClusterHead, EngineReport};
pub use errors::{DetectionError, DetectionResult};
pub use metrics::{DetectionMetrics, MetricsSnapshot};
pub use reading::{Reading, SourceId};
pub use request::{PullRequest, RequestCycle};
pub use trust::{ReliabilityTier, TrustRecord, TrustRegistry};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
