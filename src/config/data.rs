use super::traits::ConfigSection;
use crate::error::TechSignalError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding one `<symbol>.csv` per instrument
    pub data_dir: PathBuf,
    pub ticker: String,
    /// Trailing window length in calendar days
    pub days: i64,
    /// Last day of the window; today when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub min_rows: usize,
    pub references: ReferenceSymbols,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceSymbols {
    pub vix: String,
    pub sp500: String,
    pub nasdaq: String,
    pub dow: String,
}

impl Default for ReferenceSymbols {
    fn default() -> Self {
        Self {
            vix: "^VIX".to_string(),
            sp500: "^GSPC".to_string(),
            nasdaq: "^IXIC".to_string(),
            dow: "^DJI".to_string(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            ticker: "TSLA".to_string(),
            days: 180,
            end_date: None,
            min_rows: 1,
            references: ReferenceSymbols::default(),
        }
    }
}

impl ConfigSection for DataConfig {
    fn section_name() -> &'static str {
        "data"
    }

    fn validate(&self) -> Result<(), TechSignalError> {
        if self.ticker.trim().is_empty() {
            return Err(TechSignalError::Configuration(
                "Ticker must not be empty".to_string()
            ));
        }
        if self.days <= 0 {
            return Err(TechSignalError::Configuration(
                "Window length in days must be positive".to_string()
            ));
        }
        let refs = &self.references;
        if [&refs.vix, &refs.sp500, &refs.nasdaq, &refs.dow].iter().any(|s| s.trim().is_empty()) {
            return Err(TechSignalError::Configuration(
                "Reference symbols must not be empty".to_string()
            ));
        }
        Ok(())
    }
}
