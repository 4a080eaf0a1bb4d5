use crate::{
    error::{Result, TechSignalError},
    types::{columns, RowSignals, Signal, SignalFamily, SignalSet},
};
use polars::prelude::*;

pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;
pub const STOCH_OVERSOLD: f64 = 20.0;
pub const STOCH_OVERBOUGHT: f64 = 80.0;

/// Columns every row must define before any signal is derived, in `RowValues` field order.
pub const SIGNAL_INPUTS: [&str; 13] = [
    columns::CLOSE,
    columns::SMA20,
    columns::SMA50,
    columns::MACD,
    columns::MACD_SIGNAL,
    columns::RSI,
    columns::BB_UPPER,
    columns::BB_LOWER,
    columns::STOCH_K,
    columns::STOCH_D,
    columns::MOMENTUM,
    columns::CRSI,
    columns::VWAP,
];

/// The values of one row that the signal rules read
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowValues {
    pub close: f64,
    pub sma20: f64,
    pub sma50: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub rsi: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
    pub stoch_k: f64,
    pub stoch_d: f64,
    pub momentum: f64,
    pub crsi: f64,
    pub vwap: f64,
}

impl RowValues {
    fn from_slice(v: &[f64; 13]) -> Self {
        Self {
            close: v[0],
            sma20: v[1],
            sma50: v[2],
            macd: v[3],
            macd_signal: v[4],
            rsi: v[5],
            bb_upper: v[6],
            bb_lower: v[7],
            stoch_k: v[8],
            stoch_d: v[9],
            momentum: v[10],
            crsi: v[11],
            vwap: v[12],
        }
    }
}

fn band(value: f64, low: f64, high: f64) -> Signal {
    if value < low {
        Signal::Buy
    } else if value > high {
        Signal::Sell
    } else {
        Signal::Neutral
    }
}

fn above(a: f64, b: f64) -> Signal {
    if a > b {
        Signal::Buy
    } else {
        Signal::Sell
    }
}

/// Derives the per-family signals for a table carrying the indicator columns.
#[derive(Debug, Default, Clone, Copy)]
pub struct SignalGenerator;

impl SignalGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Apply the threshold rules to a single row.
    pub fn derive(values: &RowValues) -> SignalSet {
        let v = values;

        let sma = if v.close > v.sma50 && v.sma20 > v.sma50 {
            Signal::Buy
        } else if v.close < v.sma50 && v.sma20 < v.sma50 {
            Signal::Sell
        } else {
            Signal::Neutral
        };

        let bb = if v.close < v.bb_lower {
            Signal::Buy
        } else if v.close > v.bb_upper {
            Signal::Sell
        } else {
            Signal::Neutral
        };

        let stoch = if v.stoch_k < STOCH_OVERSOLD && v.stoch_d < STOCH_OVERSOLD {
            Signal::Buy
        } else if v.stoch_k > STOCH_OVERBOUGHT && v.stoch_d > STOCH_OVERBOUGHT {
            Signal::Sell
        } else {
            Signal::Neutral
        };

        let mut signals = [Signal::Neutral; SignalFamily::COUNT];
        signals[SignalFamily::Sma.index()] = sma;
        signals[SignalFamily::Macd.index()] = above(v.macd, v.macd_signal);
        signals[SignalFamily::Rsi.index()] = band(v.rsi, RSI_OVERSOLD, RSI_OVERBOUGHT);
        signals[SignalFamily::Bb.index()] = bb;
        signals[SignalFamily::Stoch.index()] = stoch;
        signals[SignalFamily::Momentum.index()] = above(v.momentum, 0.0);
        signals[SignalFamily::Crsi.index()] = band(v.crsi, RSI_OVERSOLD, RSI_OVERBOUGHT);
        signals[SignalFamily::Vwap.index()] = above(v.close, v.vwap);

        SignalSet::new(signals)
    }

    /// One entry per row of `df`; rows with undefined inputs become `NoData`.
    pub fn generate(&self, df: &DataFrame) -> Result<Vec<RowSignals>> {
        let mut inputs = Vec::with_capacity(SIGNAL_INPUTS.len());
        for name in SIGNAL_INPUTS {
            let column = df.column(name).map_err(|_| TechSignalError::MissingColumn {
                column: name.to_string(),
            })?;
            inputs.push(column.cast(&DataType::Float64)?.f64()?.clone());
        }

        let mut rows = Vec::with_capacity(df.height());
        let mut no_data = 0usize;

        for i in 0..df.height() {
            let mut values = [0.0; 13];
            let mut missing = Vec::new();
            for (slot, (name, series)) in SIGNAL_INPUTS.iter().zip(inputs.iter()).enumerate() {
                match series.get(i) {
                    Some(value) if !value.is_nan() => values[slot] = value,
                    _ => missing.push(name.to_string()),
                }
            }

            if missing.is_empty() {
                rows.push(RowSignals::Signals(Self::derive(&RowValues::from_slice(&values))));
            } else {
                log::debug!("Row {}: no signals, undefined {:?}", i, missing);
                no_data += 1;
                rows.push(RowSignals::NoData { missing });
            }
        }

        log::info!(
            "Generated signals for {} rows ({} without data)",
            rows.len(),
            no_data
        );
        Ok(rows)
    }

    /// Append a `Signal_<family>` string column per family; no-data rows are null.
    pub fn to_frame(&self, df: &DataFrame, rows: &[RowSignals]) -> Result<DataFrame> {
        if rows.len() != df.height() {
            return Err(TechSignalError::Validation(format!(
                "{} signal rows for a table of {} rows",
                rows.len(),
                df.height()
            )));
        }

        let mut out = df.clone();
        for family in SignalFamily::ALL {
            let values: Vec<Option<&str>> = rows
                .iter()
                .map(|row| row.signals().map(|set| set.get(family).as_str()))
                .collect();
            let name = format!("Signal_{}", family.name());
            out.with_column(Series::new(name.into(), values))?;
        }
        Ok(out)
    }
}
