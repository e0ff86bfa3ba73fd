//! Full runs over a small trace written to a temporary directory

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use clusterguard_core::EngineConfig;
use clusterguard_sim::export::{export_metrics_csv, export_report_json, METRICS_HEADER};
use clusterguard_sim::{DataProvider, Injection, SimConfig, SimError, Simulation};
use tempfile::TempDir;

/// Three motes, `per_mote` records each, gently varying on every channel
fn write_trace(path: &Path, per_mote: usize) {
    let mut text = String::new();
    for i in 0..per_mote {
        for (offset, mote) in [36u32, 37, 38].iter().enumerate() {
            writeln!(
                text,
                "2004-03-12 10:{:02}:{:02}.000000 {} {} {:.4} {:.4} {:.2} {:.5}",
                (i / 60) % 60,
                i % 60,
                i,
                mote,
                20.0 + (i % 7) as f64 * 0.3 + offset as f64 * 0.2,
                40.0 - (i % 5) as f64 * 0.4,
                100.0 + (i % 11) as f64 * 2.0,
                2.6 + (i % 3) as f64 * 0.01,
            )
            .unwrap();
        }
    }
    // Outside the date range, never loaded
    text.push_str("2004-03-20 10:00:00.000000 1 36 99.0 1.0 9999.0 9.9\n");
    fs::write(path, text).unwrap();
}

fn config_for(dir: &TempDir, engine: EngineConfig) -> SimConfig {
    let trace = dir.path().join("data.txt");
    write_trace(&trace, 200);
    SimConfig {
        engine: engine.with_log_interval(50.0),
        data_file: Some(trace),
        injection: Injection::Exact { target: 20, multiplier: 5.0 },
        duration: 150.0,
        output_dir: dir.path().join("results"),
        ..SimConfig::default()
    }
}

#[test]
fn test_odamd_run_over_trace() {
    let dir = TempDir::new().unwrap();
    let config = config_for(&dir, EngineConfig::odamd());
    let metrics_path = config.metrics_path();
    let report_path = config.report_path();

    let outcome = Simulation::from_config(config).unwrap().run().unwrap();

    assert_eq!(outcome.source, "Intel Lab trace");
    assert_eq!(outcome.injected, 20);
    assert_eq!(outcome.report.received, 149 * 3);
    assert!(outcome.report.matrix.true_positives > 0);
    assert_eq!(outcome.sink.received, outcome.report.forwarded);
    assert_eq!(outcome.report.metrics_log.len(), 3);

    export_metrics_csv(&metrics_path, &outcome).unwrap();
    export_report_json(&report_path, &outcome).unwrap();

    let csv = fs::read_to_string(&metrics_path).unwrap();
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], METRICS_HEADER);
    assert!(lines[1].starts_with("50.00,"));
    assert!(lines[3].starts_with("150.00,"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(json["report"]["algorithm"], "ODA-MD");
    assert_eq!(json["sensors"].as_array().unwrap().len(), 3);
}

#[test]
fn test_od_run_reports_trust() {
    let dir = TempDir::new().unwrap();
    let config = config_for(&dir, EngineConfig::od());

    let outcome = Simulation::from_config(config).unwrap().run().unwrap();
    let report = &outcome.report;

    assert_eq!(report.received, 149 * 3);
    // Whole batches only; the rest is released at shutdown
    assert_eq!(report.matrix.total() % report.window_size as u64, 0);
    assert_eq!(report.matrix.total() + report.released as u64, report.received);
    assert_eq!(report.trust.len(), 3);
    assert!(report.trust.iter().all(|row| row.record.total_readings > 0));
}

#[test]
fn test_empty_date_range_is_an_error() {
    let dir = TempDir::new().unwrap();
    let mut config = config_for(&dir, EngineConfig::odamd());
    config.start_date = "2005-01-01".into();
    config.end_date = "2005-01-02".into();

    let err = Simulation::from_config(config).err().unwrap();
    assert!(matches!(err, SimError::EmptyDataset { .. }), "{err}");
}

#[test]
fn test_per_batch_injection_over_loaded_trace() {
    let dir = TempDir::new().unwrap();
    let trace = dir.path().join("data.txt");
    write_trace(&trace, 40);

    let mut provider = DataProvider::load(&trace, &SimConfig::default().dataset_filter()).unwrap();
    assert_eq!(provider.total_readings(), 120);
    // 120 readings in batches of 20
    assert_eq!(provider.inject_per_batch(1, 2.5, 20), 6);
    assert_eq!(provider.total_outliers(), 6);
}

#[test]
fn test_config_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("experiment.json");
    let mut config = SimConfig::default();
    config.engine = EngineConfig::od().with_threshold(12.0);
    config.duration = 300.0;
    fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

    let loaded = SimConfig::load(&path).unwrap();
    assert_eq!(loaded.engine.algorithm, config.engine.algorithm);
    assert_eq!(loaded.engine.threshold, 12.0);
    assert_eq!(loaded.duration, 300.0);
    assert_eq!(loaded.motes, config.motes);
    assert_eq!(loaded.injection, config.injection);

    fs::write(&path, r#"{ "duration": -1.0 }"#).unwrap();
    assert!(matches!(SimConfig::load(&path), Err(SimError::Config(_))));
}
