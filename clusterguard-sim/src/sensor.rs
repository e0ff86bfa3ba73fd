//! Member motes
//!
//! A mote answers each pull request with its next reading, paying for the
//! received request and the transmitted reply out of its own battery. A
//! depleted mote stays silent.

use clusterguard_core::constants::{CONTROL_PACKET_BITS, DATA_PACKET_BITS, MEMBER_DISTANCE_M};
use clusterguard_core::{EnergyAccountant, PullRequest, Reading, SourceId};
use serde::Serialize;

use crate::dataset::ReadingSource;

#[derive(Debug, Clone)]
pub struct SensorNode {
    mote_id: SourceId,
    energy: EnergyAccountant,
    served: u64,
    refused: u64,
}

/// Per-mote totals for the run summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorSummary {
    pub mote_id: SourceId,
    pub served: u64,
    pub refused: u64,
    pub energy_consumed_mj: f64,
    pub energy_remaining_j: f64,
}

impl SensorNode {
    pub fn new(mote_id: SourceId, initial_energy: f64) -> Self {
        Self {
            mote_id,
            energy: EnergyAccountant::new(initial_energy),
            served: 0,
            refused: 0,
        }
    }

    /// Answer `request` with the next reading from `source`
    ///
    /// Returns `None` once the battery is empty.
    pub fn respond(&mut self, request: &PullRequest, source: &mut ReadingSource) -> Option<Reading> {
        if !self.energy.is_alive() {
            self.refused += 1;
            log::debug!("Mote {} is depleted, request {} dropped", self.mote_id, request.request_id);
            return None;
        }
        self.energy.receive(CONTROL_PACKET_BITS);
        self.energy.transmit(DATA_PACKET_BITS, MEMBER_DISTANCE_M);
        self.served += 1;
        Some(source.next_reading(self.mote_id))
    }

    pub fn mote_id(&self) -> SourceId {
        self.mote_id
    }

    pub fn energy(&self) -> &EnergyAccountant {
        &self.energy
    }

    pub fn summary(&self) -> SensorSummary {
        SensorSummary {
            mote_id: self.mote_id,
            served: self.served,
            refused: self.refused,
            energy_consumed_mj: self.energy.consumed_millijoules(),
            energy_remaining_j: self.energy.remaining(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic::SyntheticSource;
    use clusterguard_core::constants::{E_AMP_J_PER_BIT_M2, E_ELEC_J_PER_BIT};

    fn request(source_id: SourceId) -> PullRequest {
        PullRequest {
            request_id: 1,
            source_id,
            issued_at: 0.0,
        }
    }

    #[test]
    fn answer_costs_one_request_and_one_reply() {
        let mut source = ReadingSource::Synthetic(SyntheticSource::new(1).unwrap());
        let mut node = SensorNode::new(36, 2.0);

        let reading = node.respond(&request(36), &mut source).unwrap();
        assert_eq!(reading.source_id, 36);

        let expected = E_ELEC_J_PER_BIT * 64.0 + E_ELEC_J_PER_BIT * 256.0 + E_AMP_J_PER_BIT_M2 * 256.0 * 400.0;
        assert!((node.energy().consumed() - expected).abs() < 1e-15);
        assert_eq!(node.summary().served, 1);
    }

    #[test]
    fn depleted_mote_stays_silent() {
        let mut source = ReadingSource::Synthetic(SyntheticSource::new(1).unwrap());
        let mut node = SensorNode::new(37, 1e-6);

        let answered = (0..100).filter(|_| node.respond(&request(37), &mut source).is_some()).count();
        let summary = node.summary();
        assert!(answered < 100);
        assert_eq!(summary.served, answered as u64);
        assert_eq!(summary.refused, 100 - answered as u64);
    }
}
