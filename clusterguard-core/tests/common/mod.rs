//! Common test utilities for integration tests
//!
//! This module provides:
//! - A deterministic reading generator modelled on the Intel Lab motes
//! - Pre-built scenarios with their expected outcomes
//! - Helpers that drive a `ClusterHead` and tally what came out

#![allow(dead_code)]

use clusterguard_core::{ClusterHead, EngineReport, Reading};

pub mod generators;
pub mod scenarios;

/// Everything a run produced
pub struct RunOutcome {
    pub forwarded: Vec<Reading>,
    pub report: EngineReport,
}

/// Feed `readings` to `head` in order and shut it down
pub fn drive(mut head: ClusterHead, readings: &[Reading]) -> RunOutcome {
    head.start(0.0);
    let mut forwarded = Vec::new();
    for reading in readings {
        forwarded.extend(head.handle_reading(*reading));
    }
    let report = head.shutdown(readings.len() as f64);
    RunOutcome { forwarded, report }
}

/// Assert two floats agree to `eps`
pub fn assert_close(actual: f64, expected: f64, eps: f64) {
    assert!(
        (actual - expected).abs() <= eps,
        "expected {} ± {}, got {}",
        expected,
        eps,
        actual
    );
}
