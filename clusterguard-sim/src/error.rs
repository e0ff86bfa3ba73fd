//! Simulator errors

use std::path::PathBuf;

use clusterguard_core::DetectionError;
use thiserror::Error;

/// Result type for simulator operations
pub type SimResult<T> = Result<T, SimError>;

/// Everything that can stop a simulation from starting or finishing
#[derive(Debug, Error)]
pub enum SimError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("engine rejected configuration: {0}")]
    Engine(#[from] DetectionError),

    #[error("no readings for motes {motes:?} between {start} and {end}")]
    EmptyDataset {
        motes: Vec<u32>,
        start: String,
        end: String,
    },
}

impl SimError {
    /// Attach a path to an I/O error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
