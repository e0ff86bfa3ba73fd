//! Result files
//!
//! - `metrics_<algo>.csv`: the cluster head's metrics log, one row per tick
//! - `report_<algo>.json`: the full run outcome

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use clusterguard_core::MetricsSnapshot;

use crate::error::{SimError, SimResult};
use crate::runtime::SimulationOutcome;

pub const METRICS_HEADER: &str = "Time,DA,FAR,CumulativeTP,CumulativeFP";

/// Write the metrics log as CSV
pub fn write_metrics_csv<W: Write>(mut out: W, snapshots: &[MetricsSnapshot]) -> std::io::Result<()> {
    writeln!(out, "{METRICS_HEADER}")?;
    for s in snapshots {
        writeln!(
            out,
            "{:.2},{:.4},{:.4},{},{}",
            s.timestamp, s.detection_accuracy, s.false_alarm_rate, s.cumulative_tp, s.cumulative_fp
        )?;
    }
    out.flush()
}

fn create(path: &Path) -> SimResult<BufWriter<File>> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| SimError::io(dir, e))?;
    }
    let file = File::create(path).map_err(|e| SimError::io(path, e))?;
    Ok(BufWriter::new(file))
}

/// Write the metrics log of `outcome` to `path`, creating parent directories
pub fn export_metrics_csv(path: impl AsRef<Path>, outcome: &SimulationOutcome) -> SimResult<()> {
    let path = path.as_ref();
    let out = create(path)?;
    write_metrics_csv(out, &outcome.report.metrics_log).map_err(|e| SimError::io(path, e))?;
    log::info!("Metrics written to {}", path.display());
    Ok(())
}

/// Write `outcome` as pretty JSON to `path`, creating parent directories
pub fn export_report_json(path: impl AsRef<Path>, outcome: &SimulationOutcome) -> SimResult<()> {
    let path = path.as_ref();
    let mut out = create(path)?;
    serde_json::to_writer_pretty(&mut out, outcome)?;
    out.flush().map_err(|e| SimError::io(path, e))?;
    log::info!("Report written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_rows_use_fixed_precision() {
        let snapshots = [
            MetricsSnapshot {
                timestamp: 100.0,
                detection_accuracy: 0.5,
                false_alarm_rate: 1.0 / 3.0,
                cumulative_tp: 4,
                cumulative_fp: 2,
            },
            MetricsSnapshot {
                timestamp: 200.0,
                detection_accuracy: 1.0,
                false_alarm_rate: 0.0,
                cumulative_tp: 9,
                cumulative_fp: 2,
            },
        ];
        let mut buf = Vec::new();
        write_metrics_csv(&mut buf, &snapshots).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines, [METRICS_HEADER, "100.00,0.5000,0.3333,4,2", "200.00,1.0000,0.0000,9,2"]);
    }
}
