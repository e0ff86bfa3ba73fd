//! Per-source trust derived from OD error history
//!
//! Each source accumulates a count of readings seen and a count of readings
//! that ended up in a lone-source outlier cluster (an *error*). Trust is the
//! complement of the error rate. Records are never reset while the engine
//! runs. The reliability tier is for reporting; detection ignores it.

use core::fmt;

#[cfg(not(feature = "std"))]
use alloc::{collections::BTreeMap, vec::Vec};
#[cfg(feature = "std")]
use std::collections::BTreeMap;

use crate::constants::quality::{TRUST_MODERATE, TRUST_RELIABLE, TRUST_UNSEEN};
use crate::reading::SourceId;

/// Reliability tier of a source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReliabilityTier {
    /// trust ≥ 0.95
    Reliable,
    /// 0.80 ≤ trust < 0.95
    Moderate,
    /// trust < 0.80
    Unreliable,
}

impl ReliabilityTier {
    /// Tier for a trust score
    pub fn from_trust(trust: f64) -> Self {
        if trust >= TRUST_RELIABLE {
            Self::Reliable
        } else if trust >= TRUST_MODERATE {
            Self::Moderate
        } else {
            Self::Unreliable
        }
    }

    /// Human-readable name
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Reliable => "reliable",
            Self::Moderate => "moderate",
            Self::Unreliable => "unreliable",
        }
    }
}

impl fmt::Display for ReliabilityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Counters for one source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrustRecord {
    /// Readings from this source that went through a batch
    pub total_readings: u64,
    /// Lone-source outlier clusters attributed to this source
    pub error_count: u64,
}

impl TrustRecord {
    /// `1 - errors / total`, or 1.0 before the first reading
    pub fn trust(&self) -> f64 {
        if self.total_readings == 0 {
            return TRUST_UNSEEN;
        }
        1.0 - self.error_count as f64 / self.total_readings as f64
    }

    /// Tier of the current trust score
    pub fn tier(&self) -> ReliabilityTier {
        ReliabilityTier::from_trust(self.trust())
    }
}

/// Report row: one source with its trust
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceTrust {
    /// Source id
    pub source_id: SourceId,
    /// Raw counters
    pub record: TrustRecord,
    /// Trust score
    pub trust: f64,
    /// Reporting tier
    pub tier: ReliabilityTier,
}

/// Trust records keyed by source id
///
/// Owned by the clustering detector; there is no global registry.
#[derive(Debug, Clone, Default)]
pub struct TrustRegistry {
    records: BTreeMap<SourceId, TrustRecord>,
}

impl TrustRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one reading from `source`
    pub fn record_reading(&mut self, source: SourceId) {
        self.records.entry(source).or_default().total_readings += 1;
    }

    /// Count one error against `source`
    pub fn record_error(&mut self, source: SourceId) {
        self.records.entry(source).or_default().error_count += 1;
    }

    /// Trust of `source`; 1.0 if never seen
    pub fn trust(&self, source: SourceId) -> f64 {
        self.records.get(&source).map_or(TRUST_UNSEEN, TrustRecord::trust)
    }

    /// Tier of `source`
    pub fn tier(&self, source: SourceId) -> ReliabilityTier {
        ReliabilityTier::from_trust(self.trust(source))
    }

    /// Raw record for `source`
    pub fn record(&self, source: SourceId) -> Option<&TrustRecord> {
        self.records.get(&source)
    }

    /// Number of known sources
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no source has been seen
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// One report row per source, ascending id
    pub fn report(&self) -> Vec<SourceTrust> {
        self.records
            .iter()
            .map(|(&source_id, record)| SourceTrust {
                source_id,
                record: *record,
                trust: record.trust(),
                tier: record.tier(),
            })
            .collect()
    }
}
