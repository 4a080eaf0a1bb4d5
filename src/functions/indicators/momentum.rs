use anyhow::{bail, Result};
use polars::lazy::dsl::when;
use polars::prelude::{lit, DataType, Expr, NULL};
use crate::functions::primitives::{
    delta, gains, losses, moving_average, pct_change, safe_div, window, MAMethod,
};
use crate::functions::traits::{series_arg, Indicator, VectorizedIndicator};
use crate::types::{columns, ScaleType};

/// Wilder RSI of an arbitrary series; 100 wherever the average loss is zero.
pub fn rsi_expr(series: Expr, period: usize) -> Expr {
    let change = delta(series, 1);

    let avg_gains = moving_average(gains(change.clone()), MAMethod::Smoothed, period);
    let avg_losses = moving_average(losses(change), MAMethod::Smoothed, period);

    let rs = avg_gains / avg_losses.clone();
    when(avg_losses.eq(lit(0.0)))
        .then(lit(100.0))
        .otherwise(lit(100.0) - (lit(100.0) / (lit(1.0) + rs)))
}

// --- RSI ---
pub struct RSI {
    pub period: usize,
}

impl RSI {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for RSI {
    fn alias(&self) -> &'static str { "RSI" }
    fn ui_name(&self) -> &'static str { "Relative Strength Index" }
    fn scale_type(&self) -> ScaleType { ScaleType::Oscillator0_100 }
    fn value_range(&self) -> Option<(f64, f64)> { Some((0.0, 100.0)) }
    fn inputs(&self) -> Vec<&'static str> { vec![columns::CLOSE] }
    fn outputs(&self) -> Vec<&'static str> { vec![columns::RSI] }
    fn warmup(&self) -> usize { self.period.saturating_sub(1) }
}

impl VectorizedIndicator for RSI {
    fn calculate_vectorized(&self, args: &[Expr]) -> Result<Vec<Expr>> {
        if self.period == 0 {
            bail!("RSI: period must be positive");
        }
        let series = series_arg(args, 0, self.alias())?;
        Ok(vec![rsi_expr(series, self.period).alias(columns::RSI)])
    }
}

// --- CRSI (relative strength against a benchmark) ---
pub struct CRSI {
    pub period: usize,
}

impl CRSI {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for CRSI {
    fn alias(&self) -> &'static str { "CRSI" }
    fn ui_name(&self) -> &'static str { "Comparative Relative Strength" }
    fn scale_type(&self) -> ScaleType { ScaleType::Oscillator0_100 }
    fn value_range(&self) -> Option<(f64, f64)> { Some((0.0, 100.0)) }
    fn inputs(&self) -> Vec<&'static str> { vec![columns::CLOSE, columns::SP500] }
    fn outputs(&self) -> Vec<&'static str> { vec![columns::CRSI] }
    fn warmup(&self) -> usize { self.period.saturating_sub(1) }
}

impl VectorizedIndicator for CRSI {
    fn calculate_vectorized(&self, args: &[Expr]) -> Result<Vec<Expr>> {
        if self.period == 0 {
            bail!("CRSI: period must be positive");
        }
        let close = series_arg(args, 0, self.alias())?;
        let benchmark = series_arg(args, 1, self.alias())?;

        let relative_returns = pct_change(close) - pct_change(benchmark);
        Ok(vec![rsi_expr(relative_returns, self.period).alias(columns::CRSI)])
    }
}

// --- Stochastic Oscillator ---
pub struct Stochastic {
    pub k_period: usize,
    pub d_period: usize,
}

impl Stochastic {
    pub fn new(k_period: usize, d_period: usize) -> Self {
        Self { k_period, d_period }
    }
}

impl Indicator for Stochastic {
    fn alias(&self) -> &'static str { "Stochastic" }
    fn ui_name(&self) -> &'static str { "Stochastic Oscillator" }
    fn scale_type(&self) -> ScaleType { ScaleType::Oscillator0_100 }
    fn value_range(&self) -> Option<(f64, f64)> { Some((0.0, 100.0)) }
    fn inputs(&self) -> Vec<&'static str> {
        vec![columns::HIGH, columns::LOW, columns::CLOSE]
    }
    fn outputs(&self) -> Vec<&'static str> { vec![columns::STOCH_K, columns::STOCH_D] }
    fn warmup(&self) -> usize { (self.k_period + self.d_period).saturating_sub(2) }
}

impl VectorizedIndicator for Stochastic {
    fn calculate_vectorized(&self, args: &[Expr]) -> Result<Vec<Expr>> {
        if self.k_period == 0 || self.d_period == 0 {
            bail!("Stochastic: periods must be positive");
        }
        let high = series_arg(args, 0, self.alias())?;
        let low = series_arg(args, 1, self.alias())?;
        let close = series_arg(args, 2, self.alias())?;

        let lowest_low = low.rolling_min(window(self.k_period));
        let highest_high = high.rolling_max(window(self.k_period));
        let range = highest_high - lowest_low.clone();

        // A flat window has no defined position inside its range.
        let k_line = when(range.clone().eq(lit(0.0)))
            .then(lit(NULL))
            .otherwise(lit(100.0) * (close - lowest_low) / range)
            .cast(DataType::Float64);
        let d_line = moving_average(k_line.clone(), MAMethod::Simple, self.d_period);

        Ok(vec![
            k_line.alias(columns::STOCH_K),
            d_line.alias(columns::STOCH_D),
        ])
    }
}

// --- ROC (Rate of Change) ---
pub struct ROC {
    pub period: usize,
}

impl ROC {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for ROC {
    fn alias(&self) -> &'static str { "ROC" }
    fn ui_name(&self) -> &'static str { "Rate of Change" }
    fn scale_type(&self) -> ScaleType { ScaleType::OscillatorCentered }
    fn value_range(&self) -> Option<(f64, f64)> { None }
    fn inputs(&self) -> Vec<&'static str> { vec![columns::CLOSE] }
    fn outputs(&self) -> Vec<&'static str> { vec![columns::MOMENTUM] }
    fn warmup(&self) -> usize { self.period }
}

impl VectorizedIndicator for ROC {
    fn calculate_vectorized(&self, args: &[Expr]) -> Result<Vec<Expr>> {
        if self.period == 0 {
            bail!("ROC: period must be positive");
        }
        let series = series_arg(args, 0, self.alias())?;
        let previous = series.clone().shift(lit(self.period as i64));

        let roc = safe_div(delta(series, self.period), previous) * lit(100.0);
        Ok(vec![roc.alias(columns::MOMENTUM)])
    }
}
