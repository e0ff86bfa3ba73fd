//! Wireless sensor network simulator for ClusterGuard
//!
//! Drives a [`ClusterHead`](clusterguard_core::ClusterHead) with member motes
//! answering pull requests, either from the Intel Berkeley Lab trace or from
//! a seeded synthetic source, and collects what reaches the sink.
//!
//! ```text
//!   RequestTick ──▶ ClusterHead ──PullRequest──▶ SensorNode ──Reading──▶ ClusterHead ──▶ Sink
//!        ▲                                            │
//!        └──────────── EventQueue (time-ordered) ◀────┘
//! ```
//!
//! ```no_run
//! use clusterguard_sim::{SimConfig, Simulation};
//!
//! let config = SimConfig::default();
//! let outcome = Simulation::from_config(config)?.run()?;
//! println!("{}", outcome.report);
//! # Ok::<(), clusterguard_sim::SimError>(())
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod runtime;
pub mod sensor;
pub mod sink;
pub mod synthetic;

pub use config::{Injection, SimConfig};
pub use dataset::{DataProvider, DatasetFilter, ReadingSource};
pub use error::{SimError, SimResult};
pub use runtime::{Simulation, SimulationOutcome};
pub use sensor::SensorNode;
pub use sink::Sink;
pub use synthetic::SyntheticSource;
