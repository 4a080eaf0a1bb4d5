use polars::df;
use polars::prelude::*;
use techsignal::config::IndicatorConfig;
use techsignal::engines::{IndicatorEngine, SignalGenerator};
use techsignal::types::{RowSignals, Signal, SignalFamily};

fn market(rows: usize, trend: f64) -> DataFrame {
    let close: Vec<f64> = (0..rows)
        .map(|i| 100.0 + trend * i as f64 + 6.0 * (i as f64 * 0.37).sin())
        .collect();
    let high: Vec<f64> = close.iter().map(|c| c + 1.5).collect();
    let low: Vec<f64> = close.iter().map(|c| c - 1.5).collect();
    let volume: Vec<f64> = (0..rows).map(|i| 2000.0 + (i % 11) as f64 * 90.0).collect();
    let sp500: Vec<f64> = (0..rows).map(|i| 1.0 + 0.001 * i as f64).collect();
    df! {
        "Close" => close,
        "High" => high,
        "Low" => low,
        "Volume" => volume,
        "SP500" => sp500,
    }
    .unwrap()
}

fn signals_for(df: &DataFrame) -> Vec<RowSignals> {
    let engine = IndicatorEngine::new(&IndicatorConfig::default());
    let table = engine.calculate(df).unwrap();
    SignalGenerator::new().generate(&table).unwrap()
}

#[test]
fn test_every_row_yields_one_entry() {
    let df = market(120, 0.1);
    let rows = signals_for(&df);
    assert_eq!(rows.len(), 120);

    // SMA50 needs 50 rows, MACD signal 34
    assert!(rows[..49].iter().all(|r| r.is_no_data()));
    assert!(rows[60..].iter().all(|r| !r.is_no_data()));
}

#[test]
fn test_signals_stay_within_family_sets() {
    for trend in [-0.4, 0.0, 0.4] {
        let rows = signals_for(&market(150, trend));
        for set in rows.iter().filter_map(|r| r.signals()) {
            for (family, signal) in set.iter() {
                assert!(
                    family.allowed().contains(&signal),
                    "{} produced {}",
                    family,
                    signal
                );
            }
        }
    }
}

#[test]
fn test_no_data_names_warmup_columns() {
    let rows = signals_for(&market(80, 0.0));
    match &rows[30] {
        RowSignals::NoData { missing } => {
            assert!(missing.contains(&"SMA50".to_string()));
            assert!(!missing.contains(&"Close".to_string()));
        }
        other => panic!("expected no data, got {:?}", other),
    }
}

#[test]
fn test_rising_market_sma_buy() {
    let rows = 60;
    let close: Vec<f64> = (0..rows).map(|i| 50.0 + i as f64 * 0.5).collect();
    let df = df! {
        "Close" => &close,
        "High" => close.iter().map(|c| c + 0.25).collect::<Vec<_>>(),
        "Low" => close.iter().map(|c| c - 0.25).collect::<Vec<_>>(),
        "Volume" => vec![1000.0; rows],
        "SP500" => vec![1.0; rows],
    }
    .unwrap();

    let signals = signals_for(&df);
    for row in &signals[49..] {
        let set = row.signals().expect("all indicators defined after warm-up");
        assert_eq!(set.get(SignalFamily::Sma), Signal::Buy);
        assert_eq!(set.get(SignalFamily::Momentum), Signal::Buy);
        assert_eq!(set.get(SignalFamily::Vwap), Signal::Buy);
        assert_eq!(set.get(SignalFamily::Rsi), Signal::Sell);
    }
}
