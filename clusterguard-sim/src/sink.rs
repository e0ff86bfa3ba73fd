//! Base station at the end of the forward path
//!
//! The sink only counts: what arrived, from whom, and how many injected
//! outliers made it past the cluster head.

use std::collections::BTreeMap;

use clusterguard_core::{Reading, SourceId};
use serde::Serialize;

#[derive(Debug, Clone, Default)]
pub struct Sink {
    received: u64,
    leaked_outliers: u64,
    flagged: u64,
    per_source: BTreeMap<SourceId, u64>,
}

/// Totals seen at the sink
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SinkSummary {
    /// Readings delivered
    pub received: u64,
    /// Injected outliers among them
    pub leaked_outliers: u64,
    /// Readings marked as outliers but forwarded anyway
    pub flagged: u64,
    /// Deliveries per mote
    pub per_source: BTreeMap<SourceId, u64>,
}

impl Sink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deliver(&mut self, reading: &Reading) {
        self.received += 1;
        self.leaked_outliers += u64::from(reading.ground_truth_outlier);
        self.flagged += u64::from(reading.detected_outlier);
        *self.per_source.entry(reading.source_id).or_insert(0) += 1;
    }

    pub fn received(&self) -> u64 {
        self.received
    }

    pub fn leaked_outliers(&self) -> u64 {
        self.leaked_outliers
    }

    pub fn summary(&self) -> SinkSummary {
        SinkSummary {
            received: self.received,
            leaked_outliers: self.leaked_outliers,
            flagged: self.flagged,
            per_source: self.per_source.clone(),
        }
    }
}
