use polars::df;
use polars::lazy::dsl;
use polars::prelude::*;
use techsignal::config::IndicatorConfig;
use techsignal::engines::IndicatorEngine;
use techsignal::functions::indicators::*;
use techsignal::functions::primitives::{moving_average, MAMethod};
use techsignal::functions::traits::VectorizedIndicator;
use techsignal::types::columns;

fn f64_values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

/// Strictly increasing closes with a constant benchmark.
fn rising_market(rows: usize) -> DataFrame {
    let close: Vec<f64> = (0..rows).map(|i| 100.0 + i as f64).collect();
    let high: Vec<f64> = close.iter().map(|c| c + 1.0).collect();
    let low: Vec<f64> = close.iter().map(|c| c - 1.0).collect();
    df! {
        "Close" => &close,
        "High" => high,
        "Low" => low,
        "Volume" => vec![1000.0; rows],
        "SP500" => vec![1.0; rows],
    }
    .unwrap()
}

fn choppy_market(rows: usize) -> DataFrame {
    let close: Vec<f64> = (0..rows)
        .map(|i| 100.0 + 8.0 * (i as f64 * 0.45).sin() + 3.0 * (i as f64 * 1.3).cos())
        .collect();
    let high: Vec<f64> = close.iter().enumerate().map(|(i, c)| c + 1.0 + (i % 3) as f64).collect();
    let low: Vec<f64> = close.iter().enumerate().map(|(i, c)| c - 1.0 - (i % 4) as f64).collect();
    let volume: Vec<f64> = (0..rows).map(|i| 5000.0 + (i % 9) as f64 * 250.0).collect();
    let sp500: Vec<f64> = (0..rows).map(|i| 1.0 + 0.02 * (i as f64 * 0.3).sin()).collect();
    df! {
        "Close" => close,
        "High" => high,
        "Low" => low,
        "Volume" => volume,
        "SP500" => sp500,
    }
    .unwrap()
}

/// Recursive average `y = (1 - alpha) * y + alpha * x`, started at the first value.
fn recursive_average(values: &[f64], alpha: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut current = values[0];
    for value in values {
        current = (1.0 - alpha) * current + alpha * value;
        out.push(current);
    }
    out
}

/// RSI over a change series whose first element is already zero-filled.
fn reference_rsi(changes: &[f64], period: usize) -> Vec<f64> {
    let alpha = 1.0 / period as f64;
    let up: Vec<f64> = changes.iter().map(|c| c.max(0.0)).collect();
    let down: Vec<f64> = changes.iter().map(|c| (-c).max(0.0)).collect();
    let avg_up = recursive_average(&up, alpha);
    let avg_down = recursive_average(&down, alpha);
    avg_up
        .iter()
        .zip(&avg_down)
        .map(|(g, l)| if *l == 0.0 { 100.0 } else { 100.0 - 100.0 / (1.0 + g / l) })
        .collect()
}

fn closes_of(df: &DataFrame, name: &str) -> Vec<f64> {
    f64_values(df, name).into_iter().map(|v| v.unwrap()).collect()
}

// ===== Single indicators =====

#[test]
fn test_sma_calculation() {
    let df = df! {
        "Close" => &[1.0, 2.0, 3.0, 4.0, 5.0],
    }
    .unwrap();

    let sma = SMA::new(3, "SMA3");
    let result_expr = sma.calculate_vectorized(&[dsl::col("Close")]).unwrap();
    let result_df = df.lazy().select(result_expr).collect().unwrap();

    // (1+2+3)/3, (2+3+4)/3, (3+4+5)/3
    let values = f64_values(&result_df, "SMA3");
    assert_eq!(values, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
}

#[test]
fn test_roc_calculation() {
    let df = df! {
        "Close" => &[100.0, 105.0, 110.0, 115.0],
    }
    .unwrap();

    let roc = ROC::new(1);
    let result_expr = roc.calculate_vectorized(&[dsl::col("Close")]).unwrap();
    let result_df = df.lazy().select(result_expr).collect().unwrap();

    let values = f64_values(&result_df, columns::MOMENTUM);
    assert!(values[0].is_none());
    assert!((values[1].unwrap() - 5.0).abs() < 1e-9);
    assert!((values[2].unwrap() - 100.0 * 5.0 / 105.0).abs() < 1e-9);
}

#[test]
fn test_atr_of_constant_range() {
    let df = rising_market(30);
    let atr = ATR::new(14);
    let result_expr = atr
        .calculate_vectorized(&[dsl::col("High"), dsl::col("Low"), dsl::col("Close")])
        .unwrap();
    let result_df = df.lazy().select(result_expr).collect().unwrap();

    let values = f64_values(&result_df, columns::ATR);
    assert!(values[12].is_none());
    for value in values.iter().skip(13) {
        assert!((value.unwrap() - 2.0).abs() < 1e-9);
    }
}

#[test]
fn test_atr_seeds_with_mean_of_first_true_ranges() {
    // One wide first bar, then a steady range of 2 around a flat close.
    let rows = 20;
    let mut high = vec![101.0; rows];
    let mut low = vec![99.0; rows];
    high[0] = 115.0;
    low[0] = 85.0;
    let df = df! {
        "High" => high,
        "Low" => low,
        "Close" => vec![100.0; rows],
    }
    .unwrap();

    let atr = ATR::new(14);
    let result_expr = atr
        .calculate_vectorized(&[dsl::col("High"), dsl::col("Low"), dsl::col("Close")])
        .unwrap();
    let result_df = df.lazy().select(result_expr).collect().unwrap();
    let values = f64_values(&result_df, columns::ATR);

    assert!(values[12].is_none());
    // (30 + 13 * 2) / 14
    assert!((values[13].unwrap() - 4.0).abs() < 1e-9);
    let expected = 2.0 + 2.0 * (13.0f64 / 14.0).powi(6);
    assert!((values[19].unwrap() - expected).abs() < 1e-9);
}

#[test]
fn test_indicator_rejects_missing_argument() {
    let macd = MACD::new(12, 26, 9);
    assert!(macd.calculate_vectorized(&[]).is_err());

    let crsi = CRSI::new(14);
    assert!(crsi.calculate_vectorized(&[dsl::col("Close")]).is_err());
}

// ===== Full battery =====

#[test]
fn test_sma_equals_mean_of_last_closes() {
    let df = choppy_market(60);
    let engine = IndicatorEngine::new(&IndicatorConfig::default());
    let result = engine.calculate(&df).unwrap();

    let close = f64_values(&result, columns::CLOSE);
    let sma20 = f64_values(&result, columns::SMA20);
    let sma50 = f64_values(&result, columns::SMA50);

    assert!(sma50[48].is_none());
    for row in 49..60 {
        assert!(sma20[row].is_some());
        assert!(sma50[row].is_some());
    }

    let last = 59;
    let expected: f64 = close[last - 19..=last].iter().map(|v| v.unwrap()).sum::<f64>() / 20.0;
    assert!((sma20[last].unwrap() - expected).abs() < 1e-9);
}

#[test]
fn test_bollinger_uses_population_deviation() {
    let df = rising_market(40);
    let engine = IndicatorEngine::new(&IndicatorConfig::default());
    let result = engine.calculate(&df).unwrap();

    let upper = f64_values(&result, columns::BB_UPPER);
    let middle = f64_values(&result, columns::BB_MIDDLE);
    let sma20 = f64_values(&result, columns::SMA20);

    // 20 consecutive integers: population variance (n^2 - 1) / 12
    let std = (399.0f64 / 12.0).sqrt();
    assert!((middle[30].unwrap() - sma20[30].unwrap()).abs() < 1e-9);
    assert!((upper[30].unwrap() - middle[30].unwrap() - 2.0 * std).abs() < 1e-6);
}

#[test]
fn test_oscillators_stay_in_range() {
    let df = choppy_market(200);
    let engine = IndicatorEngine::new(&IndicatorConfig::default());
    let result = engine.calculate(&df).unwrap();

    for name in [columns::RSI, columns::CRSI, columns::STOCH_K, columns::STOCH_D] {
        let values = f64_values(&result, name);
        assert!(values.iter().flatten().count() > 150, "{} mostly undefined", name);
        for value in values.iter().flatten() {
            assert!((0.0..=100.0).contains(value), "{} out of range: {}", name, value);
        }
    }
}

#[test]
fn test_engine_is_idempotent() {
    let df = choppy_market(120);
    let engine = IndicatorEngine::new(&IndicatorConfig::default());

    let first = engine.calculate(&df).unwrap();
    let second = engine.calculate(&df).unwrap();
    assert!(first.equals_missing(&second));
    // Input is left untouched
    assert_eq!(df.width(), 5);
}

#[test]
fn test_rising_market_emas_increase() {
    let df = rising_market(60);
    let ema = |period| {
        let out = df
            .clone()
            .lazy()
            .select([moving_average(col("Close"), MAMethod::Exponential, period).alias("ema")])
            .collect()
            .unwrap();
        f64_values(&out, "ema")
    };

    for period in [12, 26] {
        let values = ema(period);
        assert!(values[period - 2].is_none());
        let defined: Vec<f64> = values.into_iter().flatten().collect();
        assert!(defined.windows(2).all(|w| w[1] > w[0]), "EMA({}) not increasing", period);
    }

    let engine = IndicatorEngine::new(&IndicatorConfig::default());
    let result = engine.calculate(&df).unwrap();
    let rsi = f64_values(&result, columns::RSI);
    assert_eq!(rsi[59], Some(100.0));
}

// ===== Known values =====

#[test]
fn test_rsi_matches_recursive_reference() {
    let df = choppy_market(60);
    let engine = IndicatorEngine::new(&IndicatorConfig::default());
    let result = engine.calculate(&df).unwrap();

    let close = closes_of(&result, columns::CLOSE);
    let mut changes = vec![0.0];
    changes.extend(close.windows(2).map(|w| w[1] - w[0]));
    let expected = reference_rsi(&changes, 14);

    let rsi = f64_values(&result, columns::RSI);
    assert!(rsi[12].is_none());
    for row in [13, 30, 59] {
        assert!(
            (rsi[row].unwrap() - expected[row]).abs() < 1e-9,
            "RSI row {}: {:?} vs {}",
            row,
            rsi[row],
            expected[row]
        );
    }
}

#[test]
fn test_crsi_is_rsi_of_relative_returns() {
    let df = choppy_market(60);
    let engine = IndicatorEngine::new(&IndicatorConfig::default());
    let result = engine.calculate(&df).unwrap();

    let close = closes_of(&result, columns::CLOSE);
    let sp500 = closes_of(&result, columns::SP500);
    let mut relative = vec![0.0];
    relative.extend((1..close.len()).map(|i| {
        (close[i] / close[i - 1] - 1.0) - (sp500[i] / sp500[i - 1] - 1.0)
    }));
    let mut changes = vec![0.0];
    changes.extend(relative.windows(2).map(|w| w[1] - w[0]));
    // The first relative return is undefined, so its change is undefined too.
    changes[1] = 0.0;
    let expected = reference_rsi(&changes, 14);

    let crsi = f64_values(&result, columns::CRSI);
    assert!(crsi[12].is_none());
    for row in [13, 40, 59] {
        assert!(
            (crsi[row].unwrap() - expected[row]).abs() < 1e-9,
            "CRSI row {}: {:?} vs {}",
            row,
            crsi[row],
            expected[row]
        );
    }
}

#[test]
fn test_stochastic_position_in_range() {
    let df = choppy_market(60);
    let engine = IndicatorEngine::new(&IndicatorConfig::default());
    let result = engine.calculate(&df).unwrap();

    let close = closes_of(&result, columns::CLOSE);
    let high = closes_of(&result, columns::HIGH);
    let low = closes_of(&result, columns::LOW);
    let k_at = |row: usize| {
        let lowest = low[row - 13..=row].iter().cloned().fold(f64::INFINITY, f64::min);
        let highest = high[row - 13..=row].iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        100.0 * (close[row] - lowest) / (highest - lowest)
    };

    let k = f64_values(&result, columns::STOCH_K);
    let d = f64_values(&result, columns::STOCH_D);
    assert!(k[12].is_none());
    assert!((k[13].unwrap() - k_at(13)).abs() < 1e-9);
    assert!((k[45].unwrap() - k_at(45)).abs() < 1e-9);

    assert!(d[14].is_none());
    let expected_d = (k_at(13) + k_at(14) + k_at(15)) / 3.0;
    assert!((d[15].unwrap() - expected_d).abs() < 1e-9);
}

#[test]
fn test_macd_signal_starts_after_slow_and_signal_warmup() {
    let df = choppy_market(60);
    let engine = IndicatorEngine::new(&IndicatorConfig::default());
    let result = engine.calculate(&df).unwrap();

    let close = closes_of(&result, columns::CLOSE);
    let fast = recursive_average(&close, 2.0 / 13.0);
    let slow = recursive_average(&close, 2.0 / 27.0);
    let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    // The signal line starts from the first defined MACD value (row 25).
    let mut signal = vec![f64::NAN; 25];
    signal.extend(recursive_average(&line[25..], 2.0 / 10.0));

    let macd = f64_values(&result, columns::MACD);
    let macd_signal = f64_values(&result, columns::MACD_SIGNAL);
    assert!(macd[24].is_none());
    assert!((macd[25].unwrap() - line[25]).abs() < 1e-9);

    assert!(macd_signal[32].is_none());
    assert!((macd_signal[33].unwrap() - signal[33]).abs() < 1e-9);
    assert!((macd_signal[59].unwrap() - signal[59]).abs() < 1e-9);
}
