//! Intel Berkeley Lab trace loader and outlier planting
//!
//! ## Format
//!
//! One whitespace-separated record per line:
//!
//! ```text
//! date       time            epoch moteid temperature humidity light voltage
//! 2004-03-11 00:00:21.529139 2     36     19.3024     38.4629  45.08 2.68742
//! ```
//!
//! Lines that do not parse into all eight fields are skipped. Records are
//! kept when the mote is in the filter and the date falls inside the
//! inclusive range (ISO dates compare as strings).
//!
//! ## Playback
//!
//! Each mote has its own cursor; [`DataProvider::next_reading`] wraps around
//! at the end of the mote's series. A mote with no records answers with a
//! fixed indoor reading.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use clusterguard_core::{Reading, SourceId};

use crate::error::{SimError, SimResult};
use crate::synthetic::SyntheticSource;

/// Which records to keep
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetFilter {
    /// Accepted mote ids
    pub motes: Vec<SourceId>,
    /// First day (inclusive)
    pub start_date: String,
    /// Last day (inclusive)
    pub end_date: String,
}

impl DatasetFilter {
    fn accepts(&self, record: &LabRecord) -> bool {
        self.motes.contains(&record.reading.source_id)
            && record.date.as_str() >= self.start_date.as_str()
            && record.date.as_str() <= self.end_date.as_str()
    }
}

/// One parsed trace line
#[derive(Debug, Clone, PartialEq)]
pub struct LabRecord {
    pub date: String,
    pub time: String,
    pub epoch: u64,
    pub reading: Reading,
}

impl LabRecord {
    /// Parse one trace line; `None` for malformed lines
    pub fn parse(line: &str) -> Option<Self> {
        let mut fields = line.split_whitespace();
        let date = fields.next()?.to_string();
        let time = fields.next()?.to_string();
        let epoch = fields.next()?.parse().ok()?;
        let mote: SourceId = fields.next()?.parse().ok()?;
        let mut values = [0.0f64; 4];
        for value in values.iter_mut() {
            *value = fields.next()?.parse().ok()?;
        }
        Some(Self {
            date,
            time,
            epoch,
            reading: Reading::from_features(mote, values),
        })
    }
}

/// Answer for motes without any records
pub const DEFAULT_READING: [f64; 4] = [20.0, 40.0, 100.0, 2.5];

/// In-memory trace, one series per mote
#[derive(Debug, Clone, Default)]
pub struct DataProvider {
    series: BTreeMap<SourceId, Vec<Reading>>,
    cursors: BTreeMap<SourceId, usize>,
    injected: usize,
}

impl DataProvider {
    /// Load the trace at `path`
    ///
    /// Fails if the file cannot be read or no record passes the filter.
    pub fn load(path: impl AsRef<Path>, filter: &DatasetFilter) -> SimResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| SimError::io(path, e))?;
        let provider = Self::from_reader(BufReader::new(file), filter)
            .map_err(|e| SimError::io(path, e))?;

        if provider.total_readings() == 0 {
            return Err(SimError::EmptyDataset {
                motes: filter.motes.clone(),
                start: filter.start_date.clone(),
                end: filter.end_date.clone(),
            });
        }
        log::info!(
            "Loaded {} readings from {} ({} motes)",
            provider.total_readings(),
            path.display(),
            provider.series.len()
        );
        Ok(provider)
    }

    /// Parse every line of `reader`
    pub fn from_reader<R: BufRead>(reader: R, filter: &DatasetFilter) -> std::io::Result<Self> {
        let mut provider = Self::default();
        let mut skipped = 0usize;
        for line in reader.lines() {
            let line = line?;
            match LabRecord::parse(&line) {
                Some(record) if filter.accepts(&record) => provider.push(record.reading),
                Some(_) => {}
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            log::debug!("Skipped {} malformed lines", skipped);
        }
        for mote in &filter.motes {
            provider.cursors.entry(*mote).or_insert(0);
        }
        Ok(provider)
    }

    /// Provider over explicit series
    pub fn from_series(series: BTreeMap<SourceId, Vec<Reading>>) -> Self {
        let cursors = series.keys().map(|&mote| (mote, 0)).collect();
        Self {
            series,
            cursors,
            injected: 0,
        }
    }

    fn push(&mut self, reading: Reading) {
        self.series.entry(reading.source_id).or_default().push(reading);
    }

    /// Next reading of `mote`, wrapping around at the end
    pub fn next_reading(&mut self, mote: SourceId) -> Reading {
        let Some(series) = self.series.get(&mote).filter(|s| !s.is_empty()) else {
            return Reading::from_features(mote, DEFAULT_READING);
        };
        let cursor = self.cursors.entry(mote).or_insert(0);
        let reading = series[*cursor % series.len()];
        *cursor = (*cursor + 1) % series.len();
        reading
    }

    /// Records loaded across all motes
    pub fn total_readings(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }

    /// Records loaded for `mote`
    pub fn readings_count(&self, mote: SourceId) -> usize {
        self.series.get(&mote).map_or(0, Vec::len)
    }

    /// Outliers planted so far
    pub fn total_outliers(&self) -> usize {
        self.injected
    }

    /// Motes with at least one record, ascending
    pub fn motes(&self) -> impl Iterator<Item = SourceId> + '_ {
        self.series.iter().filter(|(_, s)| !s.is_empty()).map(|(&mote, _)| mote)
    }

    /// Plant `per_batch` outliers into every detection batch
    ///
    /// Assumes requests interleave the motes, so each mote contributes
    /// `batch_size / motes` readings to a batch. The outliers of batch `b`
    /// go to the reading at position `b · share` of `per_batch` consecutive
    /// motes, rotating the starting mote with the batch. A planted reading
    /// has temperature and light scaled up by `multiplier`, humidity scaled
    /// down, voltage raised by 20 %.
    pub fn inject_per_batch(&mut self, per_batch: usize, multiplier: f64, batch_size: usize) -> usize {
        let motes: Vec<SourceId> = self.motes().collect();
        if motes.is_empty() || batch_size == 0 {
            return 0;
        }
        let share = (batch_size / motes.len()).max(1);
        let shortest = motes.iter().map(|m| self.readings_count(*m)).min().unwrap_or(0);
        let batches = shortest * motes.len() / batch_size;

        let before = self.injected;
        for batch in 0..batches {
            let position = batch * share;
            for offset in 0..per_batch.min(motes.len()) {
                let mote = motes[(batch + offset) % motes.len()];
                let Some(reading) = self.series.get_mut(&mote).and_then(|s| s.get_mut(position)) else {
                    continue;
                };
                if reading.ground_truth_outlier {
                    continue;
                }
                reading.temperature *= multiplier;
                reading.humidity /= multiplier;
                reading.light *= multiplier;
                reading.voltage *= 1.2;
                reading.ground_truth_outlier = true;
                self.injected += 1;
            }
        }
        self.injected - before
    }

    /// Plant exactly `target` outliers (or as many as there are readings)
    ///
    /// Readings are walked mote by mote at an even stride. Four shapes
    /// rotate so the outliers do not all point the same way:
    ///
    /// | # | T | H | L | V |
    /// |---|---|---|---|---|
    /// | 0 | ×m | ÷m | ×2m | ×2 |
    /// | 1 | ÷m | ×m | ÷2m | ÷2 |
    /// | 2 | ×m | ×m | ×m | ×2.5 |
    /// | 3 | ÷m | ÷m | ÷m | ÷2.5 |
    pub fn inject_exact(&mut self, target: usize, multiplier: f64) -> usize {
        if target == 0 {
            return 0;
        }
        let slots: Vec<(SourceId, usize)> = self
            .series
            .iter()
            .flat_map(|(&mote, series)| (0..series.len()).map(move |i| (mote, i)))
            .collect();
        if slots.is_empty() {
            return 0;
        }
        let stride = (slots.len() / target).max(1);

        self.injected = 0;
        for &(mote, index) in slots.iter().step_by(stride) {
            if self.injected >= target {
                break;
            }
            let Some(reading) = self.series.get_mut(&mote).and_then(|s| s.get_mut(index)) else {
                continue;
            };
            if reading.ground_truth_outlier {
                continue;
            }
            let m = multiplier;
            let (t, h, l, v) = match self.injected % 4 {
                0 => (m, 1.0 / m, 2.0 * m, 2.0),
                1 => (1.0 / m, m, 1.0 / (2.0 * m), 0.5),
                2 => (m, m, m, 2.5),
                _ => (1.0 / m, 1.0 / m, 1.0 / m, 1.0 / 2.5),
            };
            reading.temperature *= t;
            reading.humidity *= h;
            reading.light *= l;
            reading.voltage *= v;
            reading.ground_truth_outlier = true;
            self.injected += 1;
        }
        self.injected
    }
}

/// Where member motes get their readings from
#[derive(Debug, Clone)]
pub enum ReadingSource {
    /// Recorded trace
    Dataset(DataProvider),
    /// Seeded random readings
    Synthetic(SyntheticSource),
}

impl ReadingSource {
    /// Next reading for `mote`
    pub fn next_reading(&mut self, mote: SourceId) -> Reading {
        match self {
            Self::Dataset(provider) => provider.next_reading(mote),
            Self::Synthetic(source) => source.next_reading(mote),
        }
    }

    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::Dataset(_) => "Intel Lab trace",
            Self::Synthetic(_) => "synthetic",
        }
    }
}
