use anyhow::Result;
use polars::prelude::Expr;
use crate::functions::primitives::safe_div;
use crate::functions::traits::{series_arg, Indicator, VectorizedIndicator};
use crate::types::{columns, ScaleType};

// --- VWAP ---
/// Volume-weighted average price accumulated from the first row of the table.
///
/// The running totals are never reset, so on a multi-day table this is a
/// window-cumulative average rather than a per-session VWAP.
pub struct VWAP;

impl VWAP {
    pub fn new() -> Self {
        Self
    }
}

impl Default for VWAP {
    fn default() -> Self {
        Self::new()
    }
}

impl Indicator for VWAP {
    fn alias(&self) -> &'static str { "VWAP" }
    fn ui_name(&self) -> &'static str { "Volume Weighted Average Price" }
    fn scale_type(&self) -> ScaleType { ScaleType::Price }
    fn value_range(&self) -> Option<(f64, f64)> { None }
    fn inputs(&self) -> Vec<&'static str> { vec![columns::CLOSE, columns::VOLUME] }
    fn outputs(&self) -> Vec<&'static str> { vec![columns::VWAP] }
    fn warmup(&self) -> usize { 0 }
}

impl VectorizedIndicator for VWAP {
    fn calculate_vectorized(&self, args: &[Expr]) -> Result<Vec<Expr>> {
        let close = series_arg(args, 0, self.alias())?;
        let volume = series_arg(args, 1, self.alias())?;

        let traded_value = (close * volume.clone()).cum_sum(false);
        let traded_volume = volume.cum_sum(false);

        Ok(vec![safe_div(traded_value, traded_volume).alias(columns::VWAP)])
    }
}
