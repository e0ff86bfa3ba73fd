//! Outlier Detectors
//!
//! ## Overview
//!
//! A detector takes readings one at a time, buffers them, and when its
//! trigger condition is met decides for each buffered reading whether it is
//! an outlier. Two implementations share the [`kernel`](crate::kernel):
//!
//! | Detector | Buffer | Trigger | Decision |
//! |----------|--------|---------|----------|
//! | [`SlidingWindowDetector`] (ODA-MD) | sliding window | every admission once full | Mahalanobis ≥ threshold |
//! | [`ClusteringDetector`] (OD) | batch, drained | batch full | cluster score ≥ mean + σ |
//!
//! ## Output Side
//!
//! Detectors never touch the radio or the counters directly. Every decision
//! goes through a [`DetectionSink`], which is the only place that
//!
//! - records the decision into [`DetectionMetrics`]
//! - charges [`EnergyAccountant`] for receiving, processing and forwarding
//! - collects the readings that travel on to the sink node
//!
//! ```text
//! reading → admit() → [window / batch] → trigger → sink.classify(r, outlier?)
//!                                          │            ├─ metrics.record_detection
//!                                          │            └─ forward (transmit) or block
//!                                          └─ singular → sink.pass_through(r)
//! ```
//!
//! A reading released by `pass_through` was never classified: it is
//! forwarded but leaves no trace in the confusion matrix.

pub mod clustering;
pub mod sliding;

pub use clustering::{ClusteringDetector, DataCluster};
pub use sliding::{Phase, SlidingWindowDetector};

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::config::{Algorithm, EngineConfig};
use crate::energy::EnergyAccountant;
use crate::errors::DetectionResult;
use crate::metrics::DetectionMetrics;
use crate::reading::Reading;
use crate::trust::TrustRegistry;

/// Common interface of the ODA-MD and OD detectors
pub trait OutlierDetector {
    /// Admit one reading; run the detection step if the trigger is met
    fn admit(&mut self, reading: Reading, sink: &mut DetectionSink<'_>);

    /// Readings currently held in the window or batch
    fn pending(&self) -> usize;

    /// Drop every held reading without classifying it
    ///
    /// Returns how many were released.
    fn release(&mut self) -> usize;

    /// Algorithm name for logs and reports
    fn name(&self) -> &'static str;
}

/// Decision recorder shared by both detectors for one admission
///
/// Borrows the engine's metrics and energy for the duration of a single
/// `admit` call and collects what the admission produced.
pub struct DetectionSink<'a> {
    metrics: &'a mut DetectionMetrics,
    energy: &'a mut EnergyAccountant,
    packet_bits: u32,
    forward_distance: f64,
    forwarded: Vec<Reading>,
    blocked: u64,
    unclassified: u64,
    operations: u64,
}

impl<'a> DetectionSink<'a> {
    /// Sink charging `energy` with the given packet size and uplink distance
    pub fn new(
        metrics: &'a mut DetectionMetrics,
        energy: &'a mut EnergyAccountant,
        packet_bits: u32,
        forward_distance: f64,
    ) -> Self {
        Self {
            metrics,
            energy,
            packet_bits,
            forward_distance,
            forwarded: Vec::new(),
            blocked: 0,
            unclassified: 0,
            operations: 0,
        }
    }

    /// Charge reception of one data packet
    pub fn receive(&mut self) {
        self.energy.receive(self.packet_bits);
    }

    /// Charge `operations` CPU operations
    pub fn process(&mut self, operations: u32) {
        self.energy.process(operations);
        self.operations += u64::from(operations);
    }

    /// Record a decision; forward the reading unless it is an outlier
    pub fn classify(&mut self, mut reading: Reading, outlier: bool) {
        self.metrics.record_detection(reading.ground_truth_outlier, outlier);
        reading.detected_outlier = outlier;
        if outlier {
            self.blocked += 1;
        } else {
            self.forward(reading);
        }
    }

    /// Forward a reading that could not be classified
    pub fn pass_through(&mut self, mut reading: Reading) {
        reading.detected_outlier = false;
        self.unclassified += 1;
        self.forward(reading);
    }

    fn forward(&mut self, reading: Reading) {
        self.energy.transmit(self.packet_bits, self.forward_distance);
        self.forwarded.push(reading);
    }

    /// Readings forwarded so far
    pub fn forwarded(&self) -> &[Reading] {
        &self.forwarded
    }

    /// Readings blocked so far
    pub fn blocked(&self) -> u64 {
        self.blocked
    }

    /// Readings passed through unclassified so far
    pub fn unclassified(&self) -> u64 {
        self.unclassified
    }

    /// CPU operations charged so far
    pub fn operations(&self) -> u64 {
        self.operations
    }

    /// Consume the sink, returning its tallies
    pub fn finish(self) -> Admission {
        Admission {
            forwarded: self.forwarded,
            blocked: self.blocked,
            unclassified: self.unclassified,
            operations: self.operations,
        }
    }
}

/// What one admission produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Admission {
    /// Readings to hand to the sink node, in classification order
    pub forwarded: Vec<Reading>,
    /// Readings withheld as outliers
    pub blocked: u64,
    /// Readings forwarded without a decision
    pub unclassified: u64,
    /// CPU operations charged
    pub operations: u64,
}

/// Active detector, chosen once at construction
#[derive(Debug, Clone)]
pub enum Detector {
    /// ODA-MD
    SlidingWindow(SlidingWindowDetector),
    /// OD
    Clustering(ClusteringDetector),
}

impl Detector {
    /// Build the detector named by `config.algorithm`
    pub fn from_config(config: &EngineConfig) -> DetectionResult<Self> {
        config.validate()?;
        Ok(match config.algorithm {
            Algorithm::OdaMd => Self::SlidingWindow(SlidingWindowDetector::new(
                config.window_size,
                config.threshold,
                config.regularization,
            )),
            Algorithm::Od => Self::Clustering(ClusteringDetector::new(
                config.window_size,
                config.cluster_width,
                config.threshold,
            )),
        })
    }

    /// Trust records, for the clustering detector only
    pub fn trust(&self) -> Option<&TrustRegistry> {
        match self {
            Self::SlidingWindow(_) => None,
            Self::Clustering(detector) => Some(detector.trust()),
        }
    }
}

impl OutlierDetector for Detector {
    fn admit(&mut self, reading: Reading, sink: &mut DetectionSink<'_>) {
        match self {
            Self::SlidingWindow(detector) => detector.admit(reading, sink),
            Self::Clustering(detector) => detector.admit(reading, sink),
        }
    }

    fn pending(&self) -> usize {
        match self {
            Self::SlidingWindow(detector) => detector.pending(),
            Self::Clustering(detector) => detector.pending(),
        }
    }

    fn release(&mut self) -> usize {
        match self {
            Self::SlidingWindow(detector) => detector.release(),
            Self::Clustering(detector) => detector.release(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::SlidingWindow(detector) => detector.name(),
            Self::Clustering(detector) => detector.name(),
        }
    }
}
