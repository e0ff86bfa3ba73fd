//! Discrete-event run loop
//!
//! A single time-ordered queue carries every event of the network. Radio
//! hops add the configured link delay; the cluster head's own timers are
//! rearmed from the deadlines it returns.
//!
//! ```text
//! t      RequestTick ─▶ PullRequest × motes          (+ link delay)
//! t+δ    RequestDelivery ─▶ SensorNode::respond       (+ link delay)
//! t+2δ   ReadingDelivery ─▶ ClusterHead::handle_reading
//! t+3δ   SinkDelivery ─▶ Sink
//! ```
//!
//! Events at equal times run in the order they were scheduled. The run
//! stops at the configured duration; anything still queued is discarded and
//! the cluster head is shut down at that instant.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};
use std::fmt;

use clusterguard_core::time::SimTime;
use clusterguard_core::{ClusterHead, EngineReport, PullRequest, Reading, SourceId};
use serde::Serialize;

use crate::config::{Injection, SimConfig};
use crate::dataset::{DataProvider, ReadingSource};
use crate::error::SimResult;
use crate::sensor::{SensorNode, SensorSummary};
use crate::sink::{Sink, SinkSummary};
use crate::synthetic::SyntheticSource;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Cluster head metrics timer
    LogTick,
    /// Cluster head request timer
    RequestTick,
    /// Pull request arriving at a member
    RequestDelivery(PullRequest),
    /// Member reading arriving at the cluster head
    ReadingDelivery(Reading),
    /// Forwarded reading arriving at the sink
    SinkDelivery(Reading),
}

#[derive(Debug)]
struct Scheduled {
    time: SimTime,
    seq: u64,
    event: Event,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    // Reversed: BinaryHeap is a max-heap and the earliest event must pop first
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-queue of timestamped events, FIFO among equal times
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Scheduled>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, time: SimTime, event: Event) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Scheduled { time, seq, event });
    }

    pub fn pop(&mut self) -> Option<(SimTime, Event)> {
        self.heap.pop().map(|s| (s.time, s.event))
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// Everything a finished run produced
#[derive(Debug, Clone, Serialize)]
pub struct SimulationOutcome {
    /// Cluster head report at shutdown
    pub report: EngineReport,
    /// What reached the sink
    pub sink: SinkSummary,
    /// Per-mote totals
    pub sensors: Vec<SensorSummary>,
    /// Events processed before the deadline
    pub events: u64,
    /// Where readings came from
    pub source: &'static str,
    /// Outliers planted into the trace
    pub injected: usize,
}

impl fmt::Display for SimulationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.report)?;
        writeln!(f, "----------------------------------------")?;
        writeln!(f, "Source:            {} ({} injected)", self.source, self.injected)?;
        writeln!(f, "Events:            {}", self.events)?;
        write!(
            f,
            "Sink:              {} received, {} injected outliers leaked",
            self.sink.received, self.sink.leaked_outliers
        )?;
        for sensor in &self.sensors {
            write!(
                f,
                "\nMote {:>4}: served {} refused {} energy {:.4} mJ",
                sensor.mote_id, sensor.served, sensor.refused, sensor.energy_consumed_mj
            )?;
        }
        Ok(())
    }
}

/// One configured run, ready to go
pub struct Simulation {
    config: SimConfig,
    head: ClusterHead,
    sensors: BTreeMap<SourceId, SensorNode>,
    source: ReadingSource,
    sink: Sink,
    queue: EventQueue,
    injected: usize,
}

impl Simulation {
    /// Build a run around an explicit reading source
    pub fn new(config: SimConfig, source: ReadingSource) -> SimResult<Self> {
        config.validate()?;
        let head = ClusterHead::new(config.engine.clone())?.with_members(config.motes.clone());
        let sensors = config
            .motes
            .iter()
            .map(|&mote| (mote, SensorNode::new(mote, config.sensor_energy)))
            .collect();
        let injected = match &source {
            ReadingSource::Dataset(provider) => provider.total_outliers(),
            ReadingSource::Synthetic(_) => 0,
        };
        Ok(Self {
            config,
            head,
            sensors,
            source,
            sink: Sink::new(),
            queue: EventQueue::new(),
            injected,
        })
    }

    /// Build a run, loading and preparing the trace named in `config`
    ///
    /// Falls back to synthetic readings when no trace is configured or the
    /// file does not exist.
    pub fn from_config(config: SimConfig) -> SimResult<Self> {
        config.validate()?;
        let source = open_source(&config)?;
        log::info!("Reading source: {}", source.label());
        Self::new(config, source)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Run to the configured duration
    pub fn run(mut self) -> SimResult<SimulationOutcome> {
        let duration = self.config.duration;
        let delay = self.config.link_delay;

        let deadlines = self.head.start(0.0);
        self.queue.schedule(deadlines.log, Event::LogTick);
        self.queue.schedule(deadlines.request, Event::RequestTick);

        let mut events = 0u64;
        while let Some((now, event)) = self.queue.pop() {
            if now > duration {
                break;
            }
            events += 1;
            self.dispatch(now, delay, event);
        }
        log::debug!("Stopped at {} with {} events pending", duration, self.queue.len());

        let report = self.head.shutdown(duration);
        Ok(SimulationOutcome {
            report,
            sink: self.sink.summary(),
            sensors: self.sensors.values().map(SensorNode::summary).collect(),
            events,
            source: self.source.label(),
            injected: self.injected,
        })
    }

    fn dispatch(&mut self, now: SimTime, delay: SimTime, event: Event) {
        match event {
            Event::LogTick => {
                if let Some(next) = self.head.on_log_timer(now) {
                    self.queue.schedule(next, Event::LogTick);
                }
            }
            Event::RequestTick => {
                let (requests, next) = self.head.on_request_timer(now);
                for request in requests {
                    self.queue.schedule(now + delay, Event::RequestDelivery(request));
                }
                if let Some(next) = next {
                    self.queue.schedule(next, Event::RequestTick);
                }
            }
            Event::RequestDelivery(request) => {
                let Some(sensor) = self.sensors.get_mut(&request.source_id) else {
                    log::warn!("Request {} for unknown mote {}", request.request_id, request.source_id);
                    return;
                };
                if let Some(reading) = sensor.respond(&request, &mut self.source) {
                    self.queue.schedule(now + delay, Event::ReadingDelivery(reading));
                }
            }
            Event::ReadingDelivery(reading) => {
                for forwarded in self.head.handle_reading(reading) {
                    self.queue.schedule(now + delay, Event::SinkDelivery(forwarded));
                }
            }
            Event::SinkDelivery(reading) => self.sink.deliver(&reading),
        }
    }
}

fn open_source(config: &SimConfig) -> SimResult<ReadingSource> {
    match &config.data_file {
        Some(path) if path.exists() => {
            let mut provider = DataProvider::load(path, &config.dataset_filter())?;
            let planted = match config.injection {
                Injection::None => 0,
                Injection::PerBatch {
                    outliers_per_batch,
                    multiplier,
                    batch_size,
                } => provider.inject_per_batch(outliers_per_batch, multiplier, batch_size),
                Injection::Exact { target, multiplier } => provider.inject_exact(target, multiplier),
            };
            log::info!(
                "Injected {} outliers into {} readings",
                planted,
                provider.total_readings()
            );
            Ok(ReadingSource::Dataset(provider))
        }
        Some(path) => {
            log::warn!("Data file {} not found, using synthetic readings", path.display());
            Ok(ReadingSource::Synthetic(SyntheticSource::new(config.seed)?))
        }
        None => Ok(ReadingSource::Synthetic(SyntheticSource::new(config.seed)?)),
    }
}
