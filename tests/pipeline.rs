use chrono::{Duration, NaiveDate};
use polars::df;
use polars::prelude::*;
use techsignal::config::{AppConfig, ChartFormat};
use techsignal::data::{CsvMarketData, StaticMarketData};
use techsignal::types::{columns, SignalFamily};
use techsignal::{AnalysisPipeline, TechSignalError};

const ROWS: usize = 120;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn dates() -> Vec<NaiveDate> {
    (0..ROWS).map(|i| start() + Duration::days(i as i64)).collect()
}

fn primary() -> DataFrame {
    let close: Vec<f64> = (0..ROWS)
        .map(|i| 100.0 + 10.0 * (i as f64 / 7.0).sin() + i as f64 * 0.2)
        .collect();
    df! {
        "Date" => dates(),
        "Open" => close.iter().map(|c| c - 0.5).collect::<Vec<_>>(),
        "High" => close.iter().map(|c| c + 2.0).collect::<Vec<_>>(),
        "Low" => close.iter().map(|c| c - 2.0).collect::<Vec<_>>(),
        "Close" => &close,
        "Volume" => (0..ROWS).map(|i| 1_000_000.0 + (i % 5) as f64 * 100_000.0).collect::<Vec<_>>(),
    }
    .unwrap()
}

fn index(base: f64, step: f64) -> DataFrame {
    df! {
        "Date" => dates(),
        "Close" => (0..ROWS).map(|i| base + step * i as f64).collect::<Vec<_>>(),
    }
    .unwrap()
}

fn source() -> StaticMarketData {
    StaticMarketData::new()
        .with("TSLA", primary())
        .with("^VIX", index(15.0, 0.01))
        .with("^GSPC", index(4000.0, 3.0))
        .with("^IXIC", index(14000.0, 5.0))
        .with("^DJI", index(35000.0, 7.0))
}

fn config(chart: Option<std::path::PathBuf>) -> AppConfig {
    let mut config = AppConfig::default();
    config.data.end_date = Some(start() + Duration::days(ROWS as i64 - 1));
    config.output.chart_path = chart;
    config.output.chart_format = ChartFormat::Json;
    config
}

#[test]
fn test_end_to_end_analysis() {
    let scratch = tempfile::tempdir().unwrap();
    let chart_path = scratch.path().join("chart.json");
    let pipeline = AnalysisPipeline::new(config(Some(chart_path.clone())), source());

    let report = pipeline.run().unwrap();
    assert_eq!(report.ticker, "TSLA");
    assert_eq!(report.table.height(), ROWS);
    assert_eq!(report.signals.len(), ROWS);

    for family in SignalFamily::ALL {
        let name = format!("Signal_{}", family.name());
        assert!(report.table.column(&name).is_ok(), "missing {}", name);
    }

    let sp500 = report.table.column(columns::SP500).unwrap().f64().unwrap().clone();
    assert!((sp500.get(0).unwrap() - 1.0).abs() < 1e-12);

    let summary = report.summary.expect("latest row has every indicator");
    assert_eq!(summary.date.as_deref(), Some("2024-04-29"));
    let counts = summary.counts;
    assert_eq!(counts.buy + counts.sell + counts.neutral, SignalFamily::COUNT);

    let written = report.chart.expect("chart written");
    let figure: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&written).unwrap()).unwrap();
    let markers = figure["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|trace| trace["mode"] == "markers")
        .count();
    assert_eq!(markers, SignalFamily::COUNT);
    assert!(figure["layout"]["yaxis11"].is_object());
    assert_eq!(figure["layout"]["yaxis12"]["overlaying"], "y");
}

#[test]
fn test_chart_failure_does_not_abort() {
    let scratch = tempfile::tempdir().unwrap();
    let unwritable = scratch
        .path()
        .join("missing")
        .join("nested")
        .join("chart.json");
    let pipeline = AnalysisPipeline::new(config(Some(unwritable)), source());

    let report = pipeline.run().unwrap();
    assert!(report.chart.is_none());
    assert!(report.summary.is_some());
}

#[test]
fn test_short_window_has_no_summary() {
    let mut config = config(None);
    config.data.days = 30;
    let report = AnalysisPipeline::new(config, source()).run().unwrap();

    assert_eq!(report.table.height(), 31);
    assert!(report.signals.iter().all(|row| row.is_no_data()));
    assert!(report.summary.is_none());
}

#[test]
fn test_missing_ticker_is_unavailable() {
    let pipeline = AnalysisPipeline::new(config(None), source());
    let result = pipeline.run_for("NVDA", start() + Duration::days(60));
    assert!(matches!(result, Err(TechSignalError::DataUnavailable(_))));
}

#[test]
fn test_csv_source_end_to_end() {
    let scratch = tempfile::tempdir().unwrap();
    let dir = scratch.path().to_path_buf();

    let mut frames = vec![
        ("TSLA.csv", primary()),
        ("VIX.csv", index(15.0, 0.01)),
        ("GSPC.csv", index(4000.0, 3.0)),
        ("IXIC.csv", index(14000.0, 5.0)),
        ("DJI.csv", index(35000.0, 7.0)),
    ];
    for (name, df) in frames.iter_mut() {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        CsvWriter::new(&mut file).finish(df).unwrap();
    }

    let mut config = config(None);
    config.data.data_dir = dir.clone();
    let report = AnalysisPipeline::new(config.clone(), CsvMarketData::new(&config.data.data_dir))
        .run()
        .unwrap();
    assert_eq!(report.table.height(), ROWS);
    assert!(report.summary.is_some());
}
