//! ODA-MD: Sliding-Window Mahalanobis Detector
//!
//! ## State Machine
//!
//! ```text
//!            window fills             snapshot ok
//! Filling ───────────────▶ Initial ───────────────▶ Sliding
//!                           │   ▲                    │  ▲
//!                  singular │   │ next admission     └──┘ every admission
//!                           └───┘
//! ```
//!
//! - **Filling**: readings are admitted and held, nothing is decided.
//! - **Initial**: fires on the admission that first brings the window to
//!   capacity. One snapshot (mean, covariance, inverse) over the whole window
//!   classifies every member not yet released, oldest first.
//! - **Sliding**: each admission evicts the oldest entry, recomputes the
//!   snapshot over the new window and classifies only the newest reading.
//!
//! A reading is an outlier when its Mahalanobis distance from the window is
//! at least the threshold (3.338 by default, roughly the 0.975 quantile of a
//! χ distribution with four degrees of freedom).
//!
//! ## Singular Covariance
//!
//! When the covariance cannot be inverted the readings of that trigger are
//! forwarded unclassified and the phase does not advance. Each window entry
//! carries a `resolved` flag, so an initial trigger that fails releases its
//! members once and the retry on the next admission only covers readings
//! that arrived since.
//!
//! ## Retained Outliers
//!
//! Blocked readings are not removed from the window. Their raw values enter
//! every snapshot until they age out, widening the covariance and masking
//! similar outliers that follow.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use super::{DetectionSink, OutlierDetector};
use crate::buffer::SlidingWindow;
use crate::constants::detection::MAHALANOBIS_OPERATIONS;
use crate::kernel::{Statistics, Vector4};
use crate::reading::Reading;

/// Detector phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Window not yet full
    Filling,
    /// Window full, initial classification pending or retried
    Initial,
    /// Steady state
    Sliding,
}

#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    reading: Reading,
    resolved: bool,
}

/// ODA-MD detector state
#[derive(Debug, Clone)]
pub struct SlidingWindowDetector {
    window: SlidingWindow<WindowEntry>,
    threshold: f64,
    regularization: f64,
    phase: Phase,
    statistics: Option<Statistics>,
    last_distance: Option<f64>,
    triggers: u64,
    singular_triggers: u64,
}

impl SlidingWindowDetector {
    /// Detector with `window_size` capacity
    pub fn new(window_size: usize, threshold: f64, regularization: f64) -> Self {
        Self {
            window: SlidingWindow::new(window_size),
            threshold,
            regularization,
            phase: Phase::Filling,
            statistics: None,
            last_distance: None,
            triggers: 0,
            singular_triggers: 0,
        }
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Snapshot of the last successful trigger
    pub fn statistics(&self) -> Option<&Statistics> {
        self.statistics.as_ref()
    }

    /// Distance of the most recently classified reading
    pub fn last_distance(&self) -> Option<f64> {
        self.last_distance
    }

    /// Triggers run (successful or not)
    pub fn triggers(&self) -> u64 {
        self.triggers
    }

    /// Triggers that hit a singular covariance
    pub fn singular_triggers(&self) -> u64 {
        self.singular_triggers
    }

    /// Window contents, oldest first
    pub fn window(&self) -> impl Iterator<Item = &Reading> {
        self.window.iter().map(|entry| &entry.reading)
    }

    /// Window capacity
    pub fn capacity(&self) -> usize {
        self.window.capacity()
    }

    /// Recompute the snapshot and classify every unresolved entry
    ///
    /// Returns `false` when the covariance was singular.
    fn trigger(&mut self, sink: &mut DetectionSink<'_>) -> bool {
        self.triggers += 1;
        let rows: Vec<Vector4> = self.window.iter().map(|entry| entry.reading.features()).collect();

        match Statistics::compute(&rows, self.regularization) {
            Ok(statistics) => {
                sink.process(MAHALANOBIS_OPERATIONS);
                for entry in self.window.iter_mut().filter(|entry| !entry.resolved) {
                    let distance = statistics.distance(&entry.reading.features());
                    let outlier = distance >= self.threshold;
                    entry.resolved = true;
                    entry.reading.detected_outlier = outlier;
                    self.last_distance = Some(distance);
                    sink.classify(entry.reading, outlier);
                }
                self.statistics = Some(statistics);
                true
            }
            Err(err) => {
                self.singular_triggers += 1;
                log_warn!("ODA-MD: {}, forwarding unclassified", err);
                for entry in self.window.iter_mut().filter(|entry| !entry.resolved) {
                    entry.resolved = true;
                    sink.pass_through(entry.reading);
                }
                false
            }
        }
    }
}

impl OutlierDetector for SlidingWindowDetector {
    fn admit(&mut self, reading: Reading, sink: &mut DetectionSink<'_>) {
        sink.receive();
        self.window.push(WindowEntry { reading, resolved: false });

        match self.phase {
            Phase::Filling if !self.window.is_full() => {}
            Phase::Filling | Phase::Initial => {
                log_debug!("ODA-MD: initial classification over {} readings", self.window.len());
                self.phase = if self.trigger(sink) { Phase::Sliding } else { Phase::Initial };
            }
            Phase::Sliding => {
                self.trigger(sink);
            }
        }
    }

    fn pending(&self) -> usize {
        self.window.len()
    }

    fn release(&mut self) -> usize {
        self.window.drain().count()
    }

    fn name(&self) -> &'static str {
        "ODA-MD"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::energy::EnergyAccountant;
    use crate::metrics::DetectionMetrics;

    fn reading(source: u32, t: f64, h: f64, l: f64, v: f64) -> Reading {
        Reading::new(source, t, h, l, v)
    }

    fn admit(
        detector: &mut SlidingWindowDetector,
        metrics: &mut DetectionMetrics,
        energy: &mut EnergyAccountant,
        r: Reading,
    ) -> super::super::Admission {
        let mut sink = DetectionSink::new(metrics, energy, 256, 30.0);
        detector.admit(r, &mut sink);
        sink.finish()
    }

    #[test]
    fn holds_readings_until_full() {
        let mut detector = SlidingWindowDetector::new(3, 3.338, 0.001);
        let mut metrics = DetectionMetrics::new();
        let mut energy = EnergyAccountant::new(5.0);

        let first = admit(&mut detector, &mut metrics, &mut energy, reading(1, 20.0, 40.0, 100.0, 2.5));
        let second = admit(&mut detector, &mut metrics, &mut energy, reading(2, 21.0, 41.0, 101.0, 2.6));
        assert!(first.forwarded.is_empty() && second.forwarded.is_empty());
        assert_eq!(detector.phase(), Phase::Filling);
        assert_eq!(metrics.total_samples(), 0);

        let third = admit(&mut detector, &mut metrics, &mut energy, reading(3, 22.0, 42.0, 102.0, 2.7));
        assert_eq!(detector.phase(), Phase::Sliding);
        assert_eq!(third.forwarded.len(), 3);
        assert_eq!(metrics.total_samples(), 3);
        assert_eq!(third.operations, u64::from(MAHALANOBIS_OPERATIONS));
    }

    #[test]
    fn constant_window_then_spike_below_bound() {
        let mut detector = SlidingWindowDetector::new(3, 2.0, 0.001);
        let mut metrics = DetectionMetrics::new();
        let mut energy = EnergyAccountant::new(5.0);

        for source in 0..3 {
            admit(&mut detector, &mut metrics, &mut energy, reading(source, 1.0, 1.0, 1.0, 1.0));
        }
        assert_eq!(detector.last_distance(), Some(0.0));

        let spike = admit(&mut detector, &mut metrics, &mut energy, reading(9, 10.0, 1.0, 1.0, 1.0));
        let distance = detector.last_distance().unwrap();
        // A window of three bounds the distance at 2/sqrt(3)
        assert!((distance - 2.0 / 3f64.sqrt()).abs() < 1e-3, "distance {}", distance);
        assert_eq!(spike.forwarded.len(), 1);
        assert_eq!(spike.blocked, 0);
    }

    #[test]
    fn singular_initial_trigger_passes_through_once() {
        let mut detector = SlidingWindowDetector::new(3, 3.338, 0.0);
        let mut metrics = DetectionMetrics::new();
        let mut energy = EnergyAccountant::new(5.0);

        for source in 0..2 {
            admit(&mut detector, &mut metrics, &mut energy, reading(source, 1.0, 1.0, 1.0, 1.0));
        }
        let third = admit(&mut detector, &mut metrics, &mut energy, reading(2, 1.0, 1.0, 1.0, 1.0));
        assert_eq!(third.unclassified, 3);
        assert_eq!(detector.phase(), Phase::Initial);
        assert_eq!(metrics.total_samples(), 0);

        // Still singular: only the new reading is released
        let fourth = admit(&mut detector, &mut metrics, &mut energy, reading(3, 1.0, 1.0, 1.0, 1.0));
        assert_eq!(fourth.unclassified, 1);
        assert_eq!(fourth.forwarded.len(), 1);
        assert_eq!(detector.singular_triggers(), 2);
    }

    #[test]
    fn blocked_outlier_stays_in_window() {
        let mut detector = SlidingWindowDetector::new(4, 1.0, 0.001);
        let mut metrics = DetectionMetrics::new();
        let mut energy = EnergyAccountant::new(5.0);

        let base = [
            reading(1, 20.0, 40.0, 100.0, 2.50),
            reading(2, 21.0, 42.0, 110.0, 2.55),
            reading(3, 22.0, 39.0, 105.0, 2.45),
            reading(4, 20.5, 41.0, 95.0, 2.60),
        ];
        for r in base {
            admit(&mut detector, &mut metrics, &mut energy, r);
        }
        let spike = admit(&mut detector, &mut metrics, &mut energy, reading(5, 80.0, 5.0, 900.0, 3.2));
        assert_eq!(spike.blocked, 1);
        assert_eq!(spike.unclassified, 0);
        assert!(spike.forwarded.is_empty());

        assert_eq!(detector.pending(), 4);
        assert!(detector.window().any(|r| r.source_id == 5));
    }

    #[test]
    fn release_empties_window() {
        let mut detector = SlidingWindowDetector::new(5, 3.338, 0.001);
        let mut metrics = DetectionMetrics::new();
        let mut energy = EnergyAccountant::new(5.0);
        admit(&mut detector, &mut metrics, &mut energy, reading(1, 20.0, 40.0, 100.0, 2.5));
        admit(&mut detector, &mut metrics, &mut energy, reading(2, 20.0, 40.0, 100.0, 2.5));

        assert_eq!(detector.release(), 2);
        assert_eq!(detector.pending(), 0);
    }
}
