use super::traits::ConfigSection;
use crate::error::TechSignalError;
use serde::{Deserialize, Serialize};

/// Indicator periods. Defaults are the standard conventions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub sma_fast_period: usize,
    pub sma_slow_period: usize,
    pub macd_fast_period: usize,
    pub macd_slow_period: usize,
    pub macd_signal_period: usize,
    pub rsi_period: usize,
    pub bb_period: usize,
    pub bb_deviation: f64,
    pub atr_period: usize,
    pub stoch_k_period: usize,
    pub stoch_d_period: usize,
    pub roc_period: usize,
    pub crsi_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            sma_fast_period: 20,
            sma_slow_period: 50,
            macd_fast_period: 12,
            macd_slow_period: 26,
            macd_signal_period: 9,
            rsi_period: 14,
            bb_period: 20,
            bb_deviation: 2.0,
            atr_period: 14,
            stoch_k_period: 14,
            stoch_d_period: 3,
            roc_period: 12,
            crsi_period: 14,
        }
    }
}

impl ConfigSection for IndicatorConfig {
    fn section_name() -> &'static str {
        "indicators"
    }

    fn validate(&self) -> Result<(), TechSignalError> {
        let periods = [
            ("sma_fast_period", self.sma_fast_period),
            ("sma_slow_period", self.sma_slow_period),
            ("macd_fast_period", self.macd_fast_period),
            ("macd_slow_period", self.macd_slow_period),
            ("macd_signal_period", self.macd_signal_period),
            ("rsi_period", self.rsi_period),
            ("bb_period", self.bb_period),
            ("atr_period", self.atr_period),
            ("stoch_k_period", self.stoch_k_period),
            ("stoch_d_period", self.stoch_d_period),
            ("roc_period", self.roc_period),
            ("crsi_period", self.crsi_period),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, p)| *p == 0) {
            return Err(TechSignalError::Configuration(format!(
                "{} must be positive",
                name
            )));
        }
        if self.sma_fast_period >= self.sma_slow_period {
            return Err(TechSignalError::Configuration(
                "Fast SMA period must be shorter than slow SMA period".to_string()
            ));
        }
        if self.macd_fast_period >= self.macd_slow_period {
            return Err(TechSignalError::Configuration(
                "Fast MACD period must be shorter than slow MACD period".to_string()
            ));
        }
        if !(self.bb_deviation > 0.0) {
            return Err(TechSignalError::Configuration(
                "Bollinger deviation must be positive".to_string()
            ));
        }
        Ok(())
    }
}
