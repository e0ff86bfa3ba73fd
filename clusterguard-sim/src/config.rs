//! Simulation configuration
//!
//! Loaded from a JSON file; every field has a default matching the
//! Intel Lab experiment (motes 36-38, 11-14 March 2004, 1000 injected
//! outliers). Command-line flags override individual fields afterwards.
//!
//! ```json
//! {
//!   "engine": { "algorithm": "OD", "threshold": 15.0, "window_size": 20 },
//!   "data_file": "data.txt",
//!   "injection": { "mode": "per_batch", "outliers_per_batch": 1, "multiplier": 2.5, "batch_size": 20 },
//!   "duration": 5000.0
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use clusterguard_core::constants::SENSOR_NODE_ENERGY_J;
use clusterguard_core::{EngineConfig, SourceId};
use serde::{Deserialize, Serialize};

use crate::dataset::DatasetFilter;
use crate::error::{SimError, SimResult};

/// How outliers are planted into the loaded dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Injection {
    /// Leave the trace untouched
    None,
    /// A fixed number per detection batch, rotating across motes
    PerBatch {
        outliers_per_batch: usize,
        multiplier: f64,
        batch_size: usize,
    },
    /// Exactly `target` outliers spread evenly over the trace
    Exact { target: usize, multiplier: f64 },
}

impl Default for Injection {
    fn default() -> Self {
        Self::Exact {
            target: 1000,
            multiplier: 5.0,
        }
    }
}

/// Full simulation setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Cluster head settings
    pub engine: EngineConfig,
    /// Member motes, in request order
    pub motes: Vec<SourceId>,
    /// Intel Lab trace; synthetic readings when absent or unreadable
    pub data_file: Option<PathBuf>,
    /// First day to load (inclusive, `YYYY-MM-DD`)
    pub start_date: String,
    /// Last day to load (inclusive, `YYYY-MM-DD`)
    pub end_date: String,
    /// Outlier planting
    pub injection: Injection,
    /// Simulated seconds to run
    pub duration: f64,
    /// One-way delay on every radio hop (s)
    pub link_delay: f64,
    /// Battery of each member mote (J)
    pub sensor_energy: f64,
    /// Seed for the synthetic source
    pub seed: u64,
    /// Where metrics and reports are written
    pub output_dir: PathBuf,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            motes: vec![36, 37, 38],
            data_file: None,
            start_date: "2004-03-11".to_string(),
            end_date: "2004-03-14".to_string(),
            injection: Injection::default(),
            duration: 5000.0,
            link_delay: 0.01,
            sensor_energy: SENSOR_NODE_ENERGY_J,
            seed: 42,
            output_dir: PathBuf::from("results"),
        }
    }
}

impl SimConfig {
    /// Read and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| SimError::io(path, e))?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the simulation and engine settings
    pub fn validate(&self) -> SimResult<()> {
        self.engine.validate()?;
        if self.motes.is_empty() {
            return Err(SimError::Config("at least one mote is required".into()));
        }
        if !(self.duration > 0.0) {
            return Err(SimError::Config("duration must be positive".into()));
        }
        if !(self.link_delay >= 0.0) || self.link_delay >= self.engine.request_interval {
            return Err(SimError::Config(format!(
                "link delay {} must be non-negative and shorter than the request interval {}",
                self.link_delay, self.engine.request_interval
            )));
        }
        if self.start_date > self.end_date {
            return Err(SimError::Config(format!(
                "start date {} is after end date {}",
                self.start_date, self.end_date
            )));
        }
        match &self.injection {
            Injection::PerBatch { batch_size: 0, .. } => {
                Err(SimError::Config("injection batch size must be positive".into()))
            }
            Injection::PerBatch { multiplier, .. } | Injection::Exact { multiplier, .. }
                if !(*multiplier > 0.0) =>
            {
                Err(SimError::Config("injection multiplier must be positive".into()))
            }
            _ => Ok(()),
        }
    }

    /// Mote and date filter for the dataset loader
    pub fn dataset_filter(&self) -> DatasetFilter {
        DatasetFilter {
            motes: self.motes.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
        }
    }

    /// File name of the metrics CSV for the configured algorithm
    pub fn metrics_path(&self) -> PathBuf {
        let name = match self.engine.algorithm {
            clusterguard_core::Algorithm::OdaMd => "metrics_odamd.csv",
            clusterguard_core::Algorithm::Od => "metrics_od.csv",
        };
        self.output_dir.join(name)
    }

    /// File name of the JSON report for the configured algorithm
    pub fn report_path(&self) -> PathBuf {
        let name = match self.engine.algorithm {
            clusterguard_core::Algorithm::OdaMd => "report_odamd.json",
            clusterguard_core::Algorithm::Od => "report_od.json",
        };
        self.output_dir.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clusterguard_core::Algorithm;

    #[test]
    fn defaults_match_lab_experiment() {
        let config = SimConfig::default();
        assert_eq!(config.motes, [36, 37, 38]);
        assert_eq!(config.injection, Injection::Exact { target: 1000, multiplier: 5.0 });
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: SimConfig = serde_json::from_str(
            r#"{
                "engine": { "algorithm": "OD", "threshold": 15.0 },
                "injection": { "mode": "per_batch", "outliers_per_batch": 1, "multiplier": 2.5, "batch_size": 20 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.engine.algorithm, Algorithm::Od);
        assert_eq!(config.engine.window_size, 20);
        assert_eq!(config.start_date, "2004-03-11");
        assert!(matches!(config.injection, Injection::PerBatch { outliers_per_batch: 1, .. }));
        assert!(config.metrics_path().ends_with("metrics_od.csv"));
    }

    #[test]
    fn rejects_inverted_dates_and_slow_links() {
        let mut config = SimConfig::default();
        config.start_date = "2004-03-15".into();
        assert!(config.validate().is_err());

        let mut config = SimConfig::default();
        config.link_delay = 2.0;
        assert!(config.validate().is_err());
    }
}
