//! Detection Quality Metrics
//!
//! ## Confusion Matrix
//!
//! Every classified reading lands in exactly one cell:
//!
//! ```text
//!                    detected outlier   detected normal
//! actual outlier          TP                 FN
//! actual normal           FP                 TN
//! ```
//!
//! ## Derived Rates
//!
//! | Rate | Formula          | Empty denominator |
//! |------|------------------|-------------------|
//! | DA   | TP / (TP + FN)   | 0                 |
//! | FAR  | FP / (FP + TN)   | 0                 |
//! | Precision | TP / (TP + FP) | 0             |
//!
//! ## Time Series
//!
//! [`DetectionMetrics::log_metrics`] appends a [`MetricsSnapshot`] at a fixed
//! external cadence, independent of detection triggers. Entries are never
//! rewritten.

use core::fmt;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::time::SimTime;

/// One outcome of the 2x2 classification space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    /// Outlier flagged as outlier
    TruePositive,
    /// Normal reading flagged as outlier
    FalsePositive,
    /// Normal reading passed
    TrueNegative,
    /// Outlier passed
    FalseNegative,
}

impl Outcome {
    /// Classify a (ground truth, decision) pair
    pub const fn from_flags(actual: bool, detected: bool) -> Self {
        match (actual, detected) {
            (true, true) => Self::TruePositive,
            (false, true) => Self::FalsePositive,
            (false, false) => Self::TrueNegative,
            (true, false) => Self::FalseNegative,
        }
    }

    /// Short label
    pub const fn label(&self) -> &'static str {
        match self {
            Self::TruePositive => "TP",
            Self::FalsePositive => "FP",
            Self::TrueNegative => "TN",
            Self::FalseNegative => "FN",
        }
    }
}

/// Confusion matrix counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfusionMatrix {
    /// Correctly detected outliers
    pub true_positives: u64,
    /// Normal data flagged as outlier
    pub false_positives: u64,
    /// Normal data passed
    pub true_negatives: u64,
    /// Outliers missed
    pub false_negatives: u64,
}

impl ConfusionMatrix {
    /// Detection accuracy: TP / (TP + FN)
    pub fn detection_accuracy(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    /// False alarm rate: FP / (FP + TN)
    pub fn false_alarm_rate(&self) -> f64 {
        ratio(self.false_positives, self.false_positives + self.true_negatives)
    }

    /// Precision: TP / (TP + FP)
    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    /// Readings classified so far
    pub fn total(&self) -> u64 {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}

/// Point-in-time metrics log entry
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricsSnapshot {
    /// When the entry was logged
    pub timestamp: SimTime,
    /// Detection accuracy at that time
    pub detection_accuracy: f64,
    /// False alarm rate at that time
    pub false_alarm_rate: f64,
    /// Cumulative true positives
    pub cumulative_tp: u64,
    /// Cumulative false positives
    pub cumulative_fp: u64,
}

/// Confusion matrix plus its logged time series
#[derive(Debug, Clone, Default)]
pub struct DetectionMetrics {
    matrix: ConfusionMatrix,
    log: Vec<MetricsSnapshot>,
}

impl DetectionMetrics {
    /// Create empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one classification; increments exactly one counter
    pub fn record_detection(&mut self, actual: bool, detected: bool) -> Outcome {
        let outcome = Outcome::from_flags(actual, detected);
        match outcome {
            Outcome::TruePositive => self.matrix.true_positives += 1,
            Outcome::FalsePositive => self.matrix.false_positives += 1,
            Outcome::TrueNegative => self.matrix.true_negatives += 1,
            Outcome::FalseNegative => self.matrix.false_negatives += 1,
        }
        outcome
    }

    /// Append a snapshot of the current rates
    pub fn log_metrics(&mut self, timestamp: SimTime) -> MetricsSnapshot {
        let snapshot = MetricsSnapshot {
            timestamp,
            detection_accuracy: self.detection_accuracy(),
            false_alarm_rate: self.false_alarm_rate(),
            cumulative_tp: self.matrix.true_positives,
            cumulative_fp: self.matrix.false_positives,
        };
        self.log.push(snapshot);
        snapshot
    }

    /// Detection accuracy: TP / (TP + FN)
    pub fn detection_accuracy(&self) -> f64 {
        self.matrix.detection_accuracy()
    }

    /// False alarm rate: FP / (FP + TN)
    pub fn false_alarm_rate(&self) -> f64 {
        self.matrix.false_alarm_rate()
    }

    /// Precision: TP / (TP + FP)
    pub fn precision(&self) -> f64 {
        self.matrix.precision()
    }

    /// Current counters
    pub fn matrix(&self) -> ConfusionMatrix {
        self.matrix
    }

    /// Readings classified so far
    pub fn total_samples(&self) -> u64 {
        self.matrix.total()
    }

    /// Readings flagged as outliers (TP + FP)
    pub fn total_detected(&self) -> u64 {
        self.matrix.true_positives + self.matrix.false_positives
    }

    /// Ground-truth outliers classified so far (TP + FN)
    pub fn actual_outliers(&self) -> u64 {
        self.matrix.true_positives + self.matrix.false_negatives
    }

    /// Logged time series, oldest first
    pub fn snapshots(&self) -> &[MetricsSnapshot] {
        &self.log
    }

    /// Zero the counters and drop the log
    pub fn reset(&mut self) {
        self.matrix = ConfusionMatrix::default();
        self.log.clear();
    }

    /// Printable summary of the counters and rates
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary { matrix: self.matrix }
    }
}

/// Display adapter for [`DetectionMetrics::summary`]
#[derive(Debug, Clone, Copy)]
pub struct MetricsSummary {
    matrix: ConfusionMatrix,
}

impl fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.matrix;
        writeln!(f, "Confusion Matrix:")?;
        writeln!(f, "  True Positives (TP):  {}", m.true_positives)?;
        writeln!(f, "  False Positives (FP): {}", m.false_positives)?;
        writeln!(f, "  True Negatives (TN):  {}", m.true_negatives)?;
        writeln!(f, "  False Negatives (FN): {}", m.false_negatives)?;
        writeln!(f, "Detection Accuracy (DA): {:.4}%", m.detection_accuracy() * 100.0)?;
        writeln!(f, "False Alarm Rate (FAR):  {:.4}%", m.false_alarm_rate() * 100.0)?;
        writeln!(f, "Precision:               {:.4}%", m.precision() * 100.0)?;
        write!(f, "Total Samples Processed: {}", m.total())
    }
}
