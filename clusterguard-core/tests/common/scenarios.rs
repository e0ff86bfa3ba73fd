//! Pre-built scenarios with known outcomes

use clusterguard_core::Reading;

use super::generators::{temperature_only, LabGenerator};

/// Scenario data plus what the detector should do with it
pub struct Scenario {
    pub name: &'static str,
    pub readings: Vec<Reading>,
    pub expected_blocked: u64,
}

/// Window of three constant readings followed by a spike
///
/// Three readings can never be further than 2/sqrt(3) from their own window,
/// so a threshold of 2.0 lets the spike through.
pub fn constant_then_spike() -> Scenario {
    Scenario {
        name: "constant_then_spike",
        readings: vec![
            temperature_only(1, 1.0),
            temperature_only(2, 1.0),
            temperature_only(3, 1.0),
            temperature_only(4, 10.0),
        ],
        expected_blocked: 0,
    }
}

/// Two tight groups a hundred units apart, the smaller from a single mote
pub fn two_far_clusters() -> Scenario {
    let mut readings: Vec<Reading> = (0..8)
        .map(|i| Reading::new(36 + i % 2, 20.0 + (i % 3) as f64 * 0.5, 40.0, 100.0, 2.5))
        .collect();
    for i in 0..2 {
        readings.push(Reading::new(38, 120.0 + i as f64 * 0.5, 40.0, 100.0, 2.5).with_ground_truth(true));
    }
    Scenario {
        name: "two_far_clusters",
        readings,
        expected_blocked: 2,
    }
}

/// Steady traffic from three motes with one gross outlier every `period`
pub fn periodic_outliers(seed: u32, count: usize, period: usize) -> Vec<Reading> {
    let mut generator = LabGenerator::new(seed);
    (0..count)
        .map(|i| {
            let source = 36 + (i % 3) as u32;
            if i > 0 && i % period == 0 {
                generator.outlier(source)
            } else {
                generator.normal(source)
            }
        })
        .collect()
}
