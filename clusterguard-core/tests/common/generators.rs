//! Deterministic reading generators
//!
//! Values stay inside the ranges the Intel Berkeley Lab motes report
//! indoors: 18-26 °C, 30-45 % humidity, 50-600 lux, 2.3-2.8 V.

use clusterguard_core::{Reading, SourceId};

/// Linear congruential generator; same seed, same stream
pub struct LabGenerator {
    seed: u32,
}

impl LabGenerator {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    fn next_unit(&mut self) -> f64 {
        self.seed = self.seed.wrapping_mul(1664525).wrapping_add(1013904223);
        self.seed as f64 / u32::MAX as f64
    }

    /// Symmetric noise in `[-spread, spread]`
    fn noise(&mut self, spread: f64) -> f64 {
        (self.next_unit() - 0.5) * 2.0 * spread
    }

    /// One normal reading from `source`
    pub fn normal(&mut self, source: SourceId) -> Reading {
        Reading::new(
            source,
            22.0 + self.noise(1.5),
            38.0 + self.noise(3.0),
            300.0 + self.noise(60.0),
            2.6 + self.noise(0.05),
        )
    }

    /// A hot, dry, bright reading flagged as injected
    pub fn outlier(&mut self, source: SourceId) -> Reading {
        Reading::new(
            source,
            60.0 + self.noise(5.0),
            8.0 + self.noise(2.0),
            1500.0 + self.noise(100.0),
            3.2 + self.noise(0.05),
        )
        .with_ground_truth(true)
    }

    /// `count` normal readings cycling through `sources`
    pub fn normal_stream(&mut self, sources: &[SourceId], count: usize) -> Vec<Reading> {
        (0..count)
            .map(|i| self.normal(sources[i % sources.len()]))
            .collect()
    }
}

/// Reading varying only in temperature
pub fn temperature_only(source: SourceId, temperature: f64) -> Reading {
    Reading::new(source, temperature, 1.0, 1.0, 1.0)
}
