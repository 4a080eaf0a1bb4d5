use polars::lazy::dsl::when;
use polars::prelude::{lit, DataType, EWMOptions, Expr, RollingOptionsFixedWindow, NULL};

// --- Moving Average ---
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MAMethod {
    Simple,
    /// Span convention, alpha = 2 / (period + 1)
    Exponential,
    /// Wilder smoothing, alpha = 1 / period
    Smoothed,
}

/// Moving average of `series`, undefined until `period` observations are available.
pub fn moving_average(series: Expr, method: MAMethod, period: usize) -> Expr {
    match method {
        MAMethod::Simple => series.rolling_mean(window(period)),
        MAMethod::Exponential => series.ewm_mean(EWMOptions {
            alpha: 2.0 / (period as f64 + 1.0),
            adjust: false,
            min_periods: period,
            ..Default::default()
        }),
        MAMethod::Smoothed => series.ewm_mean(EWMOptions {
            alpha: 1.0 / period as f64,
            adjust: false,
            min_periods: period,
            ..Default::default()
        }),
    }
}

pub fn window(period: usize) -> RollingOptionsFixedWindow {
    RollingOptionsFixedWindow {
        window_size: period,
        min_periods: period,
        ..Default::default()
    }
}

// --- Standard Deviation ---
/// Rolling population standard deviation (ddof = 0).
///
/// The window is always full when defined, so the sample deviation is rescaled
/// by sqrt((n - 1) / n).
pub fn population_std(series: Expr, period: usize) -> Expr {
    let n = period as f64;
    let scale = if period > 1 { ((n - 1.0) / n).sqrt() } else { 0.0 };
    series.rolling_std(window(period)) * lit(scale)
}

/// Element-wise maximum of two series; a null on either side yields the other value.
pub fn greater_of(a: Expr, b: Expr) -> Expr {
    when(b.clone().gt(a.clone()).and(a.clone().is_not_null()))
        .then(b.clone())
        .otherwise(when(a.clone().is_null()).then(b).otherwise(a))
}

/// Division that is null wherever the denominator is zero.
pub fn safe_div(numerator: Expr, denominator: Expr) -> Expr {
    when(denominator.clone().eq(lit(0.0)))
        .then(lit(NULL))
        .otherwise(numerator / denominator)
}

/// Difference to the value `periods` rows earlier.
pub fn delta(series: Expr, periods: usize) -> Expr {
    series.clone() - series.shift(lit(periods as i64))
}

/// Fractional change to the previous row.
pub fn pct_change(series: Expr) -> Expr {
    let previous = series.clone().shift(lit(1i64));
    safe_div(series - previous.clone(), previous)
}

/// Positive part of a series; undefined inputs count as zero.
pub fn gains(series: Expr) -> Expr {
    when(series.clone().gt(lit(0.0)))
        .then(series)
        .otherwise(lit(0.0))
}

/// Magnitude of the negative part of a series; undefined inputs count as zero.
pub fn losses(series: Expr) -> Expr {
    when(series.clone().lt(lit(0.0)))
        .then(lit(0.0) - series)
        .otherwise(lit(0.0))
}

/// Wilder average seeded with a simple mean.
///
/// The first row with `period` observations holds their mean; every later row
/// is `(previous * (period - 1) + value) / period`.
pub fn wilder_average(series: Expr, period: usize) -> Expr {
    let seed = series.clone().rolling_mean(window(period));
    let seeded_rows = seed
        .clone()
        .is_not_null()
        .cast(DataType::Int64)
        .cum_sum(false);
    let is_seed_row = seeded_rows.clone().eq(lit(1i64)).and(seed.clone().is_not_null());

    let anchored = when(is_seed_row)
        .then(seed)
        .when(seeded_rows.gt_eq(lit(1i64)))
        .then(series)
        .otherwise(lit(NULL))
        .cast(DataType::Float64);

    anchored.ewm_mean(EWMOptions {
        alpha: 1.0 / period as f64,
        adjust: false,
        min_periods: 1,
        ignore_nulls: true,
        ..Default::default()
    })
}
