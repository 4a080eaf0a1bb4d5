use crate::config::DataConfig;
use crate::data::connectors::DataValidator;
use crate::data::source::{DateWindow, MarketDataSource};
use crate::error::{Result, TechSignalError};
use crate::types::columns;
use chrono::NaiveDate;
use polars::prelude::*;

/// How a reference series is attached to the primary table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReferenceScale {
    Raw,
    /// Divided by the first observed close, so the series starts at 1.0
    BaseOne,
}

/// Builds the aligned analysis table: primary OHLCV plus reference columns.
pub struct DataPreparer<S: MarketDataSource> {
    source: S,
    config: DataConfig,
}

impl<S: MarketDataSource> DataPreparer<S> {
    pub fn new(source: S, config: DataConfig) -> Self {
        Self { source, config }
    }

    /// Fetch `ticker` over the trailing `days` ending at `end` and join the
    /// reference indices onto its dates.
    pub fn prepare(&self, ticker: &str, days: i64, end: NaiveDate) -> Result<DataFrame> {
        let window = DateWindow::trailing(days, end);
        log::info!("Preparing {} from {} to {}", ticker, window.start, window.end);

        let primary = self.source.daily_history(ticker, &window)?;
        if primary.height() == 0 {
            return Err(TechSignalError::DataUnavailable(format!(
                "No price data for {} between {} and {}",
                ticker, window.start, window.end
            )));
        }

        DataValidator::validate_ohlcv(&primary)?;
        let mut table = Self::sorted_unique(
            primary,
            &[
                columns::OPEN,
                columns::HIGH,
                columns::LOW,
                columns::CLOSE,
                columns::VOLUME,
            ],
        )?;
        DataValidator::validate_minimum_rows(&table, self.config.min_rows)?;
        DataValidator::validate_date_index(&table)?;

        let refs = &self.config.references;
        let references = [
            (refs.vix.as_str(), columns::VIX, ReferenceScale::Raw),
            (refs.sp500.as_str(), columns::SP500, ReferenceScale::BaseOne),
            (refs.nasdaq.as_str(), columns::NASDAQ, ReferenceScale::BaseOne),
            (refs.dow.as_str(), columns::DOW, ReferenceScale::BaseOne),
        ];

        for (symbol, column, scale) in references {
            let reference = self.reference_series(symbol, column, scale, &window)?;
            table = table
                .lazy()
                .left_join(reference.lazy(), col(columns::DATE), col(columns::DATE))
                .sort([columns::DATE], SortMultipleOptions::default())
                .collect()?;
        }

        let nulls = DataValidator::check_nulls(&table)?;
        if !nulls.is_empty() {
            log::debug!("Reference gaps after alignment: {:?}", nulls);
        }
        log::info!("Prepared {} rows for {}", table.height(), ticker);

        Ok(table)
    }

    fn reference_series(
        &self,
        symbol: &str,
        column: &str,
        scale: ReferenceScale,
        window: &DateWindow,
    ) -> Result<DataFrame> {
        let raw = self.source.daily_history(symbol, window)?;
        if raw.height() == 0 {
            return Err(TechSignalError::DataUnavailable(format!(
                "No reference data for {} between {} and {}",
                symbol, window.start, window.end
            )));
        }
        if raw.column(columns::CLOSE).is_err() {
            return Err(TechSignalError::MissingColumn {
                column: format!("{} (reference {})", columns::CLOSE, symbol),
            });
        }

        let series = Self::sorted_unique(raw, &[columns::CLOSE])?;
        let value = match scale {
            ReferenceScale::Raw => col(columns::CLOSE),
            ReferenceScale::BaseOne => {
                let base = Self::first_close(&series, symbol)?;
                col(columns::CLOSE) / lit(base)
            }
        };

        let series = series
            .lazy()
            .select([col(columns::DATE), value.alias(column)])
            .collect()?;

        Ok(series)
    }

    fn first_close(df: &DataFrame, symbol: &str) -> Result<f64> {
        let close = df.column(columns::CLOSE)?.cast(&DataType::Float64)?;
        let first = close.f64()?.into_iter().flatten().next();
        match first {
            Some(base) if base != 0.0 => Ok(base),
            _ => Err(TechSignalError::DataUnavailable(format!(
                "Reference {} has no usable closing price to normalize by",
                symbol
            ))),
        }
    }

    /// `Date` plus `value_columns`, sorted by date with repeated dates dropped
    /// (first occurrence wins).
    fn sorted_unique(df: DataFrame, value_columns: &[&str]) -> Result<DataFrame> {
        let mut selection = vec![col(columns::DATE)];
        selection.extend(value_columns.iter().map(|name| col(*name)));

        let first_of_day = col(columns::DATE)
            .neq(col(columns::DATE).shift(lit(1i64)))
            .fill_null(lit(true));

        let before = df.height();
        let df = df
            .lazy()
            .select(selection)
            .filter(col(columns::DATE).is_not_null())
            .sort(
                [columns::DATE],
                SortMultipleOptions::default().with_maintain_order(true),
            )
            .filter(first_of_day)
            .collect()?;

        if df.height() < before {
            log::debug!("Dropped {} rows with missing or repeated dates", before - df.height());
        }
        Ok(df)
    }
}
