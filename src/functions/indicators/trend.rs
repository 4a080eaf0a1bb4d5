use crate::{
    functions::{
        primitives::{moving_average, population_std, MAMethod},
        traits::{series_arg, Indicator, VectorizedIndicator},
    },
    types::{columns, ScaleType},
};
use anyhow::{bail, Result};
use polars::prelude::{lit, Expr};

// --- SMA ---
pub struct SMA {
    pub period: usize,
    pub column: &'static str,
}

impl SMA {
    pub fn new(period: usize, column: &'static str) -> Self {
        Self { period, column }
    }
}

impl Indicator for SMA {
    fn alias(&self) -> &'static str {
        "SMA"
    }
    fn ui_name(&self) -> &'static str {
        "Simple Moving Average"
    }
    fn scale_type(&self) -> ScaleType {
        ScaleType::Price
    }
    fn value_range(&self) -> Option<(f64, f64)> {
        None
    }
    fn inputs(&self) -> Vec<&'static str> {
        vec![columns::CLOSE]
    }
    fn outputs(&self) -> Vec<&'static str> {
        vec![self.column]
    }
    fn warmup(&self) -> usize {
        self.period.saturating_sub(1)
    }
}

impl VectorizedIndicator for SMA {
    fn calculate_vectorized(&self, args: &[Expr]) -> Result<Vec<Expr>> {
        if self.period == 0 {
            bail!("SMA: period must be positive");
        }
        let series = series_arg(args, 0, self.alias())?;

        Ok(vec![moving_average(series, MAMethod::Simple, self.period).alias(self.column)])
    }
}

// --- MACD ---
pub struct MACD {
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
}

impl MACD {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self {
            fast_period,
            slow_period,
            signal_period,
        }
    }
}

impl Indicator for MACD {
    fn alias(&self) -> &'static str {
        "MACD"
    }
    fn ui_name(&self) -> &'static str {
        "Moving Average Convergence/Divergence"
    }
    fn scale_type(&self) -> ScaleType {
        ScaleType::OscillatorCentered
    }
    fn value_range(&self) -> Option<(f64, f64)> {
        None
    }
    fn inputs(&self) -> Vec<&'static str> {
        vec![columns::CLOSE]
    }
    fn outputs(&self) -> Vec<&'static str> {
        vec![columns::MACD, columns::MACD_SIGNAL]
    }
    fn warmup(&self) -> usize {
        // The signal line needs `signal_period` defined MACD values.
        (self.slow_period + self.signal_period).saturating_sub(2)
    }
}

impl VectorizedIndicator for MACD {
    fn calculate_vectorized(&self, args: &[Expr]) -> Result<Vec<Expr>> {
        if self.fast_period == 0 || self.signal_period == 0 || self.fast_period >= self.slow_period {
            bail!(
                "MACD: invalid periods {}/{}/{}",
                self.fast_period,
                self.slow_period,
                self.signal_period
            );
        }
        let series = series_arg(args, 0, self.alias())?;

        let ema_fast = moving_average(series.clone(), MAMethod::Exponential, self.fast_period);
        let ema_slow = moving_average(series, MAMethod::Exponential, self.slow_period);

        let macd_line = ema_fast - ema_slow;
        let signal_line = moving_average(macd_line.clone(), MAMethod::Exponential, self.signal_period);

        Ok(vec![
            macd_line.alias(columns::MACD),
            signal_line.alias(columns::MACD_SIGNAL),
        ])
    }
}

// --- Bollinger Bands ---
pub struct BollingerBands {
    pub period: usize,
    pub deviation: f64,
}

impl BollingerBands {
    pub fn new(period: usize, deviation: f64) -> Self {
        Self { period, deviation }
    }
}

impl Indicator for BollingerBands {
    fn alias(&self) -> &'static str {
        "BB"
    }
    fn ui_name(&self) -> &'static str {
        "Bollinger Bands"
    }
    fn scale_type(&self) -> ScaleType {
        ScaleType::Price
    }
    fn value_range(&self) -> Option<(f64, f64)> {
        None
    }
    fn inputs(&self) -> Vec<&'static str> {
        vec![columns::CLOSE]
    }
    fn outputs(&self) -> Vec<&'static str> {
        vec![columns::BB_UPPER, columns::BB_MIDDLE, columns::BB_LOWER]
    }
    fn warmup(&self) -> usize {
        self.period.saturating_sub(1)
    }
}

impl VectorizedIndicator for BollingerBands {
    fn calculate_vectorized(&self, args: &[Expr]) -> Result<Vec<Expr>> {
        if self.period == 0 || self.deviation < 0.0 {
            bail!("BB: invalid period {} / deviation {}", self.period, self.deviation);
        }
        let series = series_arg(args, 0, self.alias())?;

        let middle_band = moving_average(series.clone(), MAMethod::Simple, self.period);
        let std_dev_val = population_std(series, self.period);

        let upper_band = middle_band.clone() + (lit(self.deviation) * std_dev_val.clone());
        let lower_band = middle_band.clone() - (lit(self.deviation) * std_dev_val);

        Ok(vec![
            upper_band.alias(columns::BB_UPPER),
            middle_band.alias(columns::BB_MIDDLE),
            lower_band.alias(columns::BB_LOWER),
        ])
    }
}
