use super::traits::ConfigSection;
use crate::error::TechSignalError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where the chart is written; no chart is produced when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_path: Option<PathBuf>,
    pub chart_format: ChartFormat,
    pub chart_height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartFormat {
    Html,
    Json,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            chart_path: Some(PathBuf::from("analysis.html")),
            chart_format: ChartFormat::Html,
            chart_height: 3000,
        }
    }
}

impl ConfigSection for OutputConfig {
    fn section_name() -> &'static str {
        "output"
    }

    fn validate(&self) -> Result<(), TechSignalError> {
        if self.chart_height == 0 {
            return Err(TechSignalError::Configuration(
                "Chart height must be positive".to_string()
            ));
        }
        Ok(())
    }
}
