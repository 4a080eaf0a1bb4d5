use crate::error::{Result, TechSignalError};
use chrono::NaiveDate;
use polars::prelude::*;
use std::path::Path;
use super::{types::RequiredColumn, validator::DataValidator};

pub struct CsvConnector;

impl CsvConnector {
    /// Load CSV file into DataFrame, parsing ISO dates where possible
    pub fn load<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .map_parse_options(|opts| opts.with_try_parse_dates(true))
            .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
            .finish()
            .map_err(|e| TechSignalError::DataLoading(format!("Failed to read CSV: {}", e)))?;

        Ok(df)
    }

    /// Load, normalize and validate a full OHLCV file
    pub fn load_and_validate<P: AsRef<Path>>(path: P, min_rows: usize) -> Result<DataFrame> {
        let df = Self::normalize_columns(Self::load(&path)?)?;

        DataValidator::validate_ohlcv(&df)?;
        DataValidator::validate_minimum_rows(&df, min_rows)?;

        // Warn about nulls but don't fail
        let null_report = DataValidator::check_nulls(&df)?;
        if !null_report.is_empty() {
            log::warn!("Null values detected in {}: {:?}", path.as_ref().display(), null_report);
        }

        Ok(df)
    }

    /// Rename aliased columns to their canonical names, cast prices and volume to
    /// f64 and coerce the date column to a `Date` dtype.
    ///
    /// Columns that are absent are left absent; callers validate what they need.
    pub fn normalize_columns(mut df: DataFrame) -> Result<DataFrame> {
        for required in RequiredColumn::all() {
            let Some(actual_name) = DataValidator::find_column(&df, &required).map(str::to_string) else {
                continue;
            };

            let standard_name = required.as_str();
            if actual_name != standard_name {
                df.rename(&actual_name, standard_name.into())
                    .map_err(|e| TechSignalError::DataLoading(format!("Failed to rename column: {}", e)))?;
            }

            let column = df.column(standard_name)?;
            let normalized = match required {
                RequiredColumn::Date => Self::to_date_column(column)?,
                _ => column.cast(&DataType::Float64)?,
            };
            df.with_column(normalized)?;
        }

        Ok(df)
    }

    fn to_date_column(column: &Column) -> Result<Column> {
        match column.dtype() {
            DataType::Date => Ok(column.clone()),
            DataType::Datetime(_, _) => Ok(column.cast(&DataType::Date)?),
            DataType::String => {
                let parsed: Vec<Option<NaiveDate>> = column
                    .str()?
                    .into_iter()
                    .map(|raw| raw.and_then(Self::parse_date))
                    .collect();
                if parsed.iter().zip(column.str()?.into_iter()).any(|(p, raw)| p.is_none() && raw.is_some()) {
                    return Err(TechSignalError::DataLoading(format!(
                        "Column '{}' contains values that are not dates",
                        column.name()
                    )));
                }
                Ok(Series::new(column.name().clone(), parsed).into())
            }
            other => Err(TechSignalError::DataLoading(format!(
                "Column '{}' cannot be read as dates, found {:?}",
                column.name(),
                other
            ))),
        }
    }

    /// Accepts `YYYY-MM-DD` optionally followed by a time part.
    fn parse_date(raw: &str) -> Option<NaiveDate> {
        let day = raw.trim().get(..10)?;
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }
}
