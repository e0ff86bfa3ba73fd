//! Periodic pull requests from the cluster head to its members
//!
//! Each round gets the next request id and produces one [`PullRequest`] per
//! configured source. Members answer with a reading, which comes back in
//! through [`ClusterHead::handle_reading`](crate::ClusterHead::handle_reading).

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crate::reading::SourceId;
use crate::time::{PeriodicTimer, SimTime};

/// One request addressed to one member
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PullRequest {
    /// Round number, starting at 1
    pub request_id: u64,
    /// Addressed member
    pub source_id: SourceId,
    /// When the round fired
    pub issued_at: SimTime,
}

/// Request fan-out timer
#[derive(Debug, Clone)]
pub struct RequestCycle {
    sources: Vec<SourceId>,
    timer: PeriodicTimer,
    next_id: u64,
}

impl RequestCycle {
    /// Cycle addressing `sources` every `interval`
    pub fn new(sources: Vec<SourceId>, interval: SimTime) -> Self {
        Self {
            sources,
            timer: PeriodicTimer::new(interval),
            next_id: 1,
        }
    }

    /// Arm the timer; returns the first deadline
    pub fn start(&mut self, now: SimTime) -> SimTime {
        self.timer.start(now)
    }

    /// Run one round at `now`
    ///
    /// Returns the requests and the next deadline. A cancelled cycle returns
    /// no requests and no deadline.
    pub fn fire(&mut self, now: SimTime) -> (Vec<PullRequest>, Option<SimTime>) {
        let Some(next) = self.timer.fire(now) else {
            return (Vec::new(), None);
        };
        let request_id = self.next_id;
        self.next_id += 1;

        let requests = self
            .sources
            .iter()
            .map(|&source_id| PullRequest { request_id, source_id, issued_at: now })
            .collect();
        (requests, Some(next))
    }

    /// Stop issuing requests
    pub fn cancel(&mut self) {
        self.timer.cancel();
    }

    /// Whether the timer is armed
    pub fn is_active(&self) -> bool {
        self.timer.is_armed()
    }

    /// Addressed members
    pub fn sources(&self) -> &[SourceId] {
        &self.sources
    }

    /// Replace the addressed members; takes effect on the next round
    pub fn set_sources(&mut self, sources: Vec<SourceId>) {
        self.sources = sources;
    }

    /// Rounds issued so far
    pub fn rounds(&self) -> u64 {
        self.next_id - 1
    }
}
