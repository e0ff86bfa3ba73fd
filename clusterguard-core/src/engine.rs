//! Cluster Head Engine
//!
//! ## Overview
//!
//! [`ClusterHead`] ties the pieces together for one run: the active
//! detector, the confusion matrix, the battery, the metrics-logging timer
//! and the pull-request cycle. It is driven entirely from outside:
//!
//! ```text
//!                    ┌──────────────────── ClusterHead ─────────────────────┐
//! reading ─────────▶ │ handle_reading ─▶ Detector ─▶ DetectionSink ─────────┼─▶ forwarded
//! log tick ────────▶ │ on_log_timer     ─▶ DetectionMetrics::log_metrics    │
//! request tick ────▶ │ on_request_timer ─▶ RequestCycle ────────────────────┼─▶ pull requests
//! end of run ──────▶ │ shutdown         ─▶ EngineReport                     │
//!                    └──────────────────────────────────────────────────────┘
//! ```
//!
//! Every handler runs to completion and returns what the caller must
//! schedule or deliver next. The engine holds no clock.
//!
//! ## Energy
//!
//! | Event | Charge |
//! |-------|--------|
//! | reading admitted | `receive(packet_bits)` |
//! | ODA-MD recompute succeeded | `process(1000)` |
//! | OD batch run | `process(100)` |
//! | reading forwarded | `transmit(packet_bits, forward_distance)` |
//!
//! The cluster head never refuses work on an empty battery.
//!
//! ## Example
//!
//! ```rust
//! use clusterguard_core::{ClusterHead, EngineConfig, Reading};
//!
//! let mut head = ClusterHead::new(EngineConfig::odamd().with_window_size(4))?;
//! head.start(0.0);
//!
//! let mut forwarded = Vec::new();
//! for i in 0..4 {
//!     let t = 20.0 + i as f64;
//!     forwarded.extend(head.handle_reading(Reading::new(i, t, 40.0 - t, 100.0 + t, 2.5)));
//! }
//!
//! assert_eq!(forwarded.len() as u64 + head.blocked(), 4);
//! let report = head.shutdown(10.0);
//! assert_eq!(report.received, 4);
//! # Ok::<(), clusterguard_core::DetectionError>(())
//! ```

use core::fmt;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::config::{Algorithm, EngineConfig};
use crate::detector::{DetectionSink, Detector, OutlierDetector};
use crate::energy::EnergyAccountant;
use crate::errors::DetectionResult;
use crate::metrics::{ConfusionMatrix, DetectionMetrics, MetricsSnapshot};
use crate::reading::{Reading, SourceId};
use crate::request::{PullRequest, RequestCycle};
use crate::time::{PeriodicTimer, SimTime};
use crate::trust::SourceTrust;

/// First deadlines of the engine timers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerDeadlines {
    /// First metrics log
    pub log: SimTime,
    /// First request round
    pub request: SimTime,
}

/// Aggregation point between member motes and the sink
#[derive(Debug, Clone)]
pub struct ClusterHead {
    config: EngineConfig,
    detector: Detector,
    metrics: DetectionMetrics,
    energy: EnergyAccountant,
    log_timer: PeriodicTimer,
    requests: RequestCycle,
    received: u64,
    forwarded: u64,
    blocked: u64,
    unclassified: u64,
    rejected: u64,
    processing_delay: f64,
    running: bool,
}

impl ClusterHead {
    /// Build an engine; fails if `config` does not validate
    pub fn new(config: EngineConfig) -> DetectionResult<Self> {
        let detector = Detector::from_config(&config)?;
        log_info!(
            "ClusterHead initialized: algorithm={} threshold={} window={}",
            config.algorithm,
            config.threshold,
            config.window_size
        );
        Ok(Self {
            detector,
            metrics: DetectionMetrics::new(),
            energy: EnergyAccountant::new(config.initial_energy),
            log_timer: PeriodicTimer::new(config.log_interval),
            requests: RequestCycle::new(Vec::new(), config.request_interval),
            received: 0,
            forwarded: 0,
            blocked: 0,
            unclassified: 0,
            rejected: 0,
            processing_delay: 0.0,
            running: true,
            config,
        })
    }

    /// Address pull requests to `members`
    pub fn with_members(mut self, members: Vec<SourceId>) -> Self {
        self.requests.set_sources(members);
        self
    }

    /// Arm both timers at `now`
    pub fn start(&mut self, now: SimTime) -> TimerDeadlines {
        TimerDeadlines {
            log: self.log_timer.start(now),
            request: self.requests.start(now),
        }
    }

    /// Admit one reading; returns the readings to forward to the sink
    ///
    /// Classified readings come back with `detected_outlier` set. Readings
    /// arriving after shutdown or holding non-finite values are dropped.
    pub fn handle_reading(&mut self, reading: Reading) -> Vec<Reading> {
        if !self.running {
            log_warn!("Reading from node {} after shutdown, dropped", reading.source_id);
            return Vec::new();
        }
        if !reading.is_finite() {
            log_warn!("Non-finite reading from node {}, dropped", reading.source_id);
            self.rejected += 1;
            return Vec::new();
        }
        self.received += 1;

        let mut sink = DetectionSink::new(
            &mut self.metrics,
            &mut self.energy,
            self.config.packet_bits,
            self.config.forward_distance,
        );
        self.detector.admit(reading, &mut sink);
        let admission = sink.finish();

        self.forwarded += admission.forwarded.len() as u64;
        self.blocked += admission.blocked;
        self.unclassified += admission.unclassified;
        if let Ok(operations) = u32::try_from(admission.operations) {
            self.processing_delay += EnergyAccountant::processing_delay(operations);
        }
        admission.forwarded
    }

    /// Log a metrics snapshot at `now`; returns the next deadline
    pub fn on_log_timer(&mut self, now: SimTime) -> Option<SimTime> {
        let next = self.log_timer.fire(now)?;
        let snapshot = self.metrics.log_metrics(now);
        log_info!(
            "[{}] DA: {:.2}% FAR: {:.2}%",
            now,
            snapshot.detection_accuracy * 100.0,
            snapshot.false_alarm_rate * 100.0
        );
        Some(next)
    }

    /// Run a request round at `now`
    pub fn on_request_timer(&mut self, now: SimTime) -> (Vec<PullRequest>, Option<SimTime>) {
        self.requests.fire(now)
    }

    /// Stop the engine: cancel timers, release held readings, report
    ///
    /// Released readings are neither classified nor forwarded.
    pub fn shutdown(&mut self, now: SimTime) -> EngineReport {
        self.log_timer.cancel();
        self.requests.cancel();
        let released = if self.running { self.detector.release() } else { 0 };
        self.running = false;

        let report = self.report(now, released);
        log_info!(
            "ClusterHead shut down at {}: received={} forwarded={} blocked={} energy={:.4} mJ",
            now,
            report.received,
            report.forwarded,
            report.blocked,
            report.energy_consumed_mj
        );
        report
    }

    fn report(&self, ended_at: SimTime, released: usize) -> EngineReport {
        EngineReport {
            algorithm: self.config.algorithm,
            threshold: self.config.threshold,
            window_size: self.config.window_size,
            ended_at,
            matrix: self.metrics.matrix(),
            detection_accuracy: self.metrics.detection_accuracy(),
            false_alarm_rate: self.metrics.false_alarm_rate(),
            precision: self.metrics.precision(),
            received: self.received,
            forwarded: self.forwarded,
            blocked: self.blocked,
            unclassified: self.unclassified,
            rejected: self.rejected,
            released,
            energy_consumed_mj: self.energy.consumed_millijoules(),
            energy_remaining_j: self.energy.remaining(),
            processing_delay_s: self.processing_delay,
            request_rounds: self.requests.rounds(),
            metrics_log: self.metrics.snapshots().to_vec(),
            trust: self.detector.trust().map(|t| t.report()).unwrap_or_default(),
        }
    }

    /// Whether `shutdown` has not been called yet
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Active detector
    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    /// Confusion matrix and logged time series
    pub fn metrics(&self) -> &DetectionMetrics {
        &self.metrics
    }

    /// Battery state
    pub fn energy(&self) -> &EnergyAccountant {
        &self.energy
    }

    /// Readings admitted
    pub fn received(&self) -> u64 {
        self.received
    }

    /// Readings forwarded, classified or not
    pub fn forwarded(&self) -> u64 {
        self.forwarded
    }

    /// Readings blocked as outliers
    pub fn blocked(&self) -> u64 {
        self.blocked
    }

    /// Readings forwarded without a decision
    pub fn unclassified(&self) -> u64 {
        self.unclassified
    }

    /// Accumulated MICA2 processing delay (s)
    pub fn processing_delay(&self) -> f64 {
        self.processing_delay
    }
}

/// End-of-run summary
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EngineReport {
    /// Detector that ran
    pub algorithm: Algorithm,
    /// Distance cutoff
    pub threshold: f64,
    /// Window or batch size
    pub window_size: usize,
    /// Shutdown time
    pub ended_at: SimTime,
    /// Final confusion matrix
    pub matrix: ConfusionMatrix,
    /// Final detection accuracy
    pub detection_accuracy: f64,
    /// Final false alarm rate
    pub false_alarm_rate: f64,
    /// Final precision
    pub precision: f64,
    /// Readings admitted
    pub received: u64,
    /// Readings forwarded
    pub forwarded: u64,
    /// Readings blocked
    pub blocked: u64,
    /// Readings forwarded without a decision
    pub unclassified: u64,
    /// Non-finite readings dropped on arrival
    pub rejected: u64,
    /// Readings still held at shutdown
    pub released: usize,
    /// Energy consumed (mJ)
    pub energy_consumed_mj: f64,
    /// Energy left (J)
    pub energy_remaining_j: f64,
    /// Accumulated processing delay (s)
    pub processing_delay_s: f64,
    /// Request rounds issued
    pub request_rounds: u64,
    /// Logged metrics time series
    pub metrics_log: Vec<MetricsSnapshot>,
    /// Per-source trust (OD only)
    pub trust: Vec<SourceTrust>,
}

impl fmt::Display for EngineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.matrix;
        writeln!(f, "========================================")?;
        writeln!(f, "     CLUSTER HEAD FINAL REPORT")?;
        writeln!(f, "========================================")?;
        writeln!(f, "Algorithm:  {}", self.algorithm)?;
        writeln!(f, "Threshold:  {}", self.threshold)?;
        writeln!(f, "Batch Size: {}", self.window_size)?;
        writeln!(f, "----------------------------------------")?;
        writeln!(f, "Total Received:    {}", self.received)?;
        writeln!(f, "Outliers Detected: {}", m.true_positives + m.false_positives)?;
        writeln!(f, "Packets Forwarded: {}", self.forwarded)?;
        writeln!(f, "Unclassified:      {}", self.unclassified)?;
        writeln!(f, "Released:          {}", self.released)?;
        writeln!(f, "Energy Consumed:   {:.4} mJ", self.energy_consumed_mj)?;
        writeln!(f, "Processing Delay:  {:.4} s", self.processing_delay_s)?;
        writeln!(f, "----------------------------------------")?;
        writeln!(f, "TP={} FP={} TN={} FN={}", m.true_positives, m.false_positives, m.true_negatives, m.false_negatives)?;
        writeln!(f, "Detection Accuracy (DA): {:.4}%", self.detection_accuracy * 100.0)?;
        writeln!(f, "False Alarm Rate (FAR):  {:.4}%", self.false_alarm_rate * 100.0)?;
        write!(f, "Precision:               {:.4}%", self.precision * 100.0)?;
        for row in &self.trust {
            write!(
                f,
                "\nNode {:>4}: trust {:.3} ({}) errors {}/{}",
                row.source_id, row.trust, row.tier, row.record.error_count, row.record.total_readings
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steady(i: u32) -> Reading {
        let t = 20.0 + (i % 5) as f64 * 0.5;
        Reading::new(i % 3, t, 40.0 - t * 0.3, 100.0 + (i % 7) as f64, 2.5 + (i % 4) as f64 * 0.01)
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(ClusterHead::new(EngineConfig::odamd().with_window_size(1)).is_err());
    }

    #[test]
    fn counters_add_up() {
        let mut head = ClusterHead::new(EngineConfig::odamd().with_window_size(5)).unwrap();
        for i in 0..30 {
            head.handle_reading(steady(i));
        }
        assert_eq!(head.received(), 30);
        assert_eq!(head.forwarded() + head.blocked(), 30);
        assert_eq!(head.metrics().total_samples(), 30);
        assert!(head.processing_delay() > 0.0);
    }

    #[test]
    fn filling_window_holds_back() {
        let mut head = ClusterHead::new(EngineConfig::odamd().with_window_size(5)).unwrap();
        for i in 0..4 {
            assert!(head.handle_reading(steady(i)).is_empty());
        }
        let report = head.shutdown(1.0);
        assert_eq!(report.released, 4);
        assert_eq!(report.forwarded, 0);
        assert_eq!(report.matrix.total(), 0);
    }

    #[test]
    fn log_timer_appends_snapshots() {
        let mut head = ClusterHead::new(EngineConfig::odamd().with_log_interval(100.0)).unwrap();
        let deadlines = head.start(0.0);
        assert_eq!(deadlines.log, 100.0);

        assert_eq!(head.on_log_timer(100.0), Some(200.0));
        assert_eq!(head.on_log_timer(200.0), Some(300.0));
        assert_eq!(head.metrics().snapshots().len(), 2);

        head.shutdown(250.0);
        assert_eq!(head.on_log_timer(300.0), None);
        assert_eq!(head.metrics().snapshots().len(), 2);
    }

    #[test]
    fn request_rounds_address_members() {
        let mut head = ClusterHead::new(EngineConfig::od())
            .unwrap()
            .with_members(vec![36, 37, 38]);
        head.start(0.0);

        let (requests, next) = head.on_request_timer(1.0);
        assert_eq!(requests.len(), 3);
        assert_eq!(next, Some(2.0));
    }

    #[test]
    fn readings_after_shutdown_are_dropped() {
        let mut head = ClusterHead::new(EngineConfig::od().with_window_size(2)).unwrap();
        head.shutdown(0.0);
        assert!(head.handle_reading(steady(1)).is_empty());
        assert_eq!(head.received(), 0);
        assert!(!head.is_running());
    }

    #[test]
    fn non_finite_readings_are_rejected() {
        let mut head = ClusterHead::new(EngineConfig::odamd()).unwrap();
        head.handle_reading(Reading::new(1, f64::NAN, 40.0, 100.0, 2.5));
        let report = head.shutdown(0.0);
        assert_eq!(report.rejected, 1);
        assert_eq!(report.received, 0);
    }

    #[test]
    fn report_renders_trust_rows() {
        let mut head = ClusterHead::new(EngineConfig::od().with_window_size(3)).unwrap();
        for i in 0..3 {
            head.handle_reading(Reading::new(i, 20.0, 40.0, 100.0, 2.5));
        }
        let report = head.shutdown(5.0);
        assert_eq!(report.trust.len(), 3);
        let text = report.to_string();
        assert!(text.contains("Algorithm:  OD"));
        assert!(text.contains("Node    0: trust 1.000 (reliable)"));
    }
}
