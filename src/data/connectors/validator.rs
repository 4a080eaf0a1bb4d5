use crate::error::{Result, TechSignalError};
use polars::prelude::*;
use super::types::RequiredColumn;
use std::collections::HashMap;

pub struct DataValidator;

impl DataValidator {
    /// Validate that DataFrame has required OHLCV columns
    pub fn validate_ohlcv(df: &DataFrame) -> Result<HashMap<RequiredColumn, String>> {
        let mut column_map = HashMap::new();

        for required in RequiredColumn::ohlcv() {
            match Self::find_column(df, &required) {
                Some(col_name) => {
                    column_map.insert(required, col_name.to_string());
                }
                None => {
                    return Err(TechSignalError::MissingColumn {
                        column: format!(
                            "{} (tried aliases: {:?})",
                            required.as_str(),
                            required.aliases()
                        ),
                    });
                }
            }
        }

        // Validate column types are numeric
        for (req_col, actual_name) in &column_map {
            let series = df.column(actual_name)?;
            if !matches!(series.dtype(), DataType::Float64 | DataType::Float32 | DataType::Int64 | DataType::Int32 | DataType::UInt64 | DataType::UInt32) {
                return Err(TechSignalError::DataLoading(format!(
                    "Column '{}' ({}) must be numeric, found {:?}",
                    actual_name,
                    req_col.as_str(),
                    series.dtype()
                )));
            }
        }

        Self::validate_ohlc_relationships(df, &column_map)?;

        Ok(column_map)
    }

    /// Find column by checking aliases
    pub fn find_column<'a>(df: &'a DataFrame, required: &RequiredColumn) -> Option<&'a str> {
        df.get_column_names()
            .into_iter()
            .find(|col| required.aliases().iter().any(|alias| *alias == col.as_str()))
            .map(|col| col.as_str())
    }

    /// Validate OHLC relationships (high >= low, high >= open, high >= close, etc.)
    fn validate_ohlc_relationships(
        df: &DataFrame,
        column_map: &HashMap<RequiredColumn, String>,
    ) -> Result<()> {
        let lookup = |required: RequiredColumn| -> Result<Column> {
            let name = column_map.get(&required).ok_or_else(|| TechSignalError::MissingColumn {
                column: required.as_str().to_string(),
            })?;
            Ok(df.column(name)?.cast(&DataType::Float64)?)
        };

        let high = lookup(RequiredColumn::High)?;
        let low = lookup(RequiredColumn::Low)?;
        let open = lookup(RequiredColumn::Open)?;
        let close = lookup(RequiredColumn::Close)?;

        let high = high.f64()?;
        let low = low.f64()?;
        let open = open.f64()?;
        let close = close.f64()?;

        for i in 0..df.height() {
            if let (Some(h), Some(l), Some(o), Some(c)) = (
                high.get(i),
                low.get(i),
                open.get(i),
                close.get(i),
            ) {
                if h < l {
                    return Err(TechSignalError::Validation(format!(
                        "Invalid data at row {}: high ({}) < low ({})",
                        i, h, l
                    )));
                }
                if h < o || h < c {
                    return Err(TechSignalError::Validation(format!(
                        "Invalid data at row {}: high ({}) < open ({}) or close ({})",
                        i, h, o, c
                    )));
                }
                if l > o || l > c {
                    return Err(TechSignalError::Validation(format!(
                        "Invalid data at row {}: low ({}) > open ({}) or close ({})",
                        i, l, o, c
                    )));
                }
            }
        }

        Ok(())
    }

    /// Dates must be present, typed as dates, and strictly increasing.
    pub fn validate_date_index(df: &DataFrame) -> Result<()> {
        let name = RequiredColumn::Date.as_str();
        let dates = df.column(name).map_err(|_| TechSignalError::MissingColumn {
            column: name.to_string(),
        })?;

        if dates.dtype() != &DataType::Date {
            return Err(TechSignalError::Validation(format!(
                "Column '{}' must be a date, found {:?}",
                name,
                dates.dtype()
            )));
        }

        let days = dates.cast(&DataType::Int32)?;
        let days = days.i32()?;
        let mut previous: Option<i32> = None;
        for (i, day) in days.into_iter().enumerate() {
            let day = day.ok_or_else(|| {
                TechSignalError::Validation(format!("Missing date at row {}", i))
            })?;
            if let Some(prev) = previous {
                if day <= prev {
                    return Err(TechSignalError::Validation(format!(
                        "Dates must be strictly increasing: row {} does not follow row {}",
                        i,
                        i - 1
                    )));
                }
            }
            previous = Some(day);
        }

        Ok(())
    }

    /// Check for minimum required rows
    pub fn validate_minimum_rows(df: &DataFrame, min_rows: usize) -> Result<()> {
        if df.height() < min_rows {
            return Err(TechSignalError::DataUnavailable(format!(
                "Insufficient data: {} rows, minimum {} required",
                df.height(),
                min_rows
            )));
        }
        Ok(())
    }

    /// Check for null values in critical columns
    pub fn check_nulls(df: &DataFrame) -> Result<Vec<(String, usize)>> {
        let mut null_report = Vec::new();

        for column in df.get_columns() {
            let null_count = column.null_count();
            if null_count > 0 {
                null_report.push((column.name().to_string(), null_count));
            }
        }

        Ok(null_report)
    }
}
