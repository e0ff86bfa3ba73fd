//! Seeded random readings for runs without a trace file
//!
//! Channels are independent normals around typical indoor conditions.
//! A small share of readings is drawn hot and marked as ground-truth
//! outliers so detection metrics stay meaningful.

use clusterguard_core::{Reading, SourceId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::error::{SimError, SimResult};

/// Share of synthetic readings drawn as outliers
pub const SYNTHETIC_OUTLIER_RATE: f64 = 0.05;

#[derive(Debug, Clone)]
pub struct SyntheticSource {
    rng: StdRng,
    temperature: Normal<f64>,
    humidity: Normal<f64>,
    light: Normal<f64>,
    voltage: Normal<f64>,
    hot: Normal<f64>,
    generated: u64,
    outliers: u64,
}

fn normal(mean: f64, std_dev: f64) -> SimResult<Normal<f64>> {
    Normal::new(mean, std_dev)
        .map_err(|e| SimError::Config(format!("invalid normal N({mean}, {std_dev}): {e}")))
}

impl SyntheticSource {
    pub fn new(seed: u64) -> SimResult<Self> {
        Ok(Self {
            rng: StdRng::seed_from_u64(seed),
            temperature: normal(23.0, 2.0)?,
            humidity: normal(35.0, 5.0)?,
            light: normal(400.0, 100.0)?,
            voltage: normal(2.5, 0.1)?,
            hot: normal(60.0, 10.0)?,
            generated: 0,
            outliers: 0,
        })
    }

    pub fn next_reading(&mut self, mote: SourceId) -> Reading {
        let outlier = self.rng.gen_bool(SYNTHETIC_OUTLIER_RATE);
        let temperature = if outlier {
            self.hot.sample(&mut self.rng)
        } else {
            self.temperature.sample(&mut self.rng)
        };
        let reading = Reading::new(
            mote,
            temperature,
            self.humidity.sample(&mut self.rng),
            self.light.sample(&mut self.rng),
            self.voltage.sample(&mut self.rng),
        )
        .with_ground_truth(outlier);

        self.generated += 1;
        self.outliers += u64::from(outlier);
        reading
    }

    /// Readings produced so far
    pub fn generated(&self) -> u64 {
        self.generated
    }

    /// Outliers among them
    pub fn outliers(&self) -> u64 {
        self.outliers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = SyntheticSource::new(7).unwrap();
        let mut b = SyntheticSource::new(7).unwrap();
        for _ in 0..50 {
            assert_eq!(a.next_reading(36), b.next_reading(36));
        }
    }

    #[test]
    fn outlier_share_is_small() {
        let mut source = SyntheticSource::new(42).unwrap();
        for _ in 0..4000 {
            let reading = source.next_reading(1);
            assert!(reading.is_finite());
            assert_eq!(reading.source_id, 1);
        }
        assert_eq!(source.generated(), 4000);
        let share = source.outliers() as f64 / 4000.0;
        assert!(share > 0.02 && share < 0.08, "outlier share {share}");
    }
}
