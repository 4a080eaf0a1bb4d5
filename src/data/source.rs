use crate::data::connectors::CsvConnector;
use crate::error::Result;
use crate::types::columns;
use chrono::{Duration, NaiveDate};
use polars::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// From `days` calendar days before `end` through `end` itself.
    ///
    /// Both ends are included, so the window spans `days + 1` calendar days and
    /// a bar dated `end` is part of the analysis.
    pub fn trailing(days: i64, end: NaiveDate) -> Self {
        Self {
            start: end - Duration::days(days),
            end,
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.start && day <= self.end
    }
}

/// Provider of daily price history.
///
/// An unknown symbol or an empty window yields an empty frame; it is up to the
/// caller to decide whether that is fatal.
pub trait MarketDataSource {
    fn daily_history(&self, symbol: &str, window: &DateWindow) -> Result<DataFrame>;
}

impl<S: MarketDataSource + ?Sized> MarketDataSource for &S {
    fn daily_history(&self, symbol: &str, window: &DateWindow) -> Result<DataFrame> {
        (**self).daily_history(symbol, window)
    }
}

/// Reads `<data_dir>/<symbol>.csv`, one file per instrument.
pub struct CsvMarketData {
    data_dir: PathBuf,
}

impl CsvMarketData {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    /// `^GSPC` is stored as `GSPC.csv`.
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        let stem: String = symbol
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
            .collect();
        self.data_dir.join(format!("{}.csv", stem))
    }
}

impl MarketDataSource for CsvMarketData {
    fn daily_history(&self, symbol: &str, window: &DateWindow) -> Result<DataFrame> {
        let path = self.path_for(symbol);
        if !path.exists() {
            log::debug!("No data file for {} at {}", symbol, path.display());
            return Ok(DataFrame::empty());
        }

        let df = CsvConnector::normalize_columns(CsvConnector::load(&path)?)?;
        restrict_to_window(df, window)
    }
}

/// In-memory source keyed by symbol.
#[derive(Default, Clone)]
pub struct StaticMarketData {
    frames: HashMap<String, DataFrame>,
}

impl StaticMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: impl Into<String>, df: DataFrame) {
        self.frames.insert(symbol.into(), df);
    }

    pub fn with(mut self, symbol: impl Into<String>, df: DataFrame) -> Self {
        self.insert(symbol, df);
        self
    }
}

impl MarketDataSource for StaticMarketData {
    fn daily_history(&self, symbol: &str, window: &DateWindow) -> Result<DataFrame> {
        match self.frames.get(symbol) {
            Some(df) => restrict_to_window(CsvConnector::normalize_columns(df.clone())?, window),
            None => Ok(DataFrame::empty()),
        }
    }
}

/// Keep the rows whose `Date` falls inside `window`.
pub fn restrict_to_window(df: DataFrame, window: &DateWindow) -> Result<DataFrame> {
    if df.height() == 0 {
        return Ok(df);
    }

    let filtered = df
        .lazy()
        .filter(
            col(columns::DATE)
                .gt_eq(lit(window.start))
                .and(col(columns::DATE).lt_eq(lit(window.end))),
        )
        .collect()?;

    Ok(filtered)
}
