use anyhow::{bail, Result};
use polars::prelude::{lit, Expr};
use crate::functions::primitives::{greater_of, wilder_average};
use crate::functions::traits::{series_arg, Indicator, VectorizedIndicator};
use crate::types::{columns, ScaleType};

// --- ATR (Average True Range) ---
pub struct ATR {
    pub period: usize,
}

impl ATR {
    pub fn new(period: usize) -> Self {
        Self { period }
    }
}

impl Indicator for ATR {
    fn alias(&self) -> &'static str { "ATR" }
    fn ui_name(&self) -> &'static str { "Average True Range" }
    fn scale_type(&self) -> ScaleType { ScaleType::Volatility }
    fn value_range(&self) -> Option<(f64, f64)> { Some((0.0, f64::MAX)) }
    fn inputs(&self) -> Vec<&'static str> {
        vec![
            columns::HIGH,
            columns::LOW,
            columns::CLOSE,
        ]
    }
    fn outputs(&self) -> Vec<&'static str> { vec![columns::ATR] }
    fn warmup(&self) -> usize { self.period.saturating_sub(1) }
}

impl VectorizedIndicator for ATR {
    fn calculate_vectorized(&self, args: &[Expr]) -> Result<Vec<Expr>> {
        if self.period == 0 {
            bail!("ATR: period must be positive");
        }
        let high = series_arg(args, 0, self.alias())?;
        let low = series_arg(args, 1, self.alias())?;
        let close = series_arg(args, 2, self.alias())?;

        let prev_close = close.shift(lit(1i64));

        let tr1 = high.clone() - low.clone();
        let tr2 = (high - prev_close.clone()).abs();
        let tr3 = (low - prev_close).abs();

        // First row has no previous close, so its true range is high - low.
        let true_range = greater_of(tr1, greater_of(tr2, tr3));

        let atr = wilder_average(true_range, self.period);
        Ok(vec![atr.alias(columns::ATR)])
    }
}
