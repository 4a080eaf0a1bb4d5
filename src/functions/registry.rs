use crate::{
    config::IndicatorConfig,
    functions::{
        indicators::{
            momentum::{Stochastic, CRSI, ROC, RSI},
            trend::{BollingerBands, MACD, SMA},
            volatility::ATR,
            volume::VWAP,
        },
        traits::VectorizedIndicator,
    },
    types::columns,
};
use std::sync::Arc;

/// The fixed indicator battery, in computation order.
pub struct FunctionRegistry {
    indicators: Vec<Arc<dyn VectorizedIndicator>>,
}

impl FunctionRegistry {
    pub fn new(config: &IndicatorConfig) -> Self {
        let mut registry = Self {
            indicators: Vec::new(),
        };
        registry.register_indicators(config);
        registry
    }

    /// Look up by alias (`"RSI"`) or by produced column (`"SMA50"`).
    pub fn get_indicator(&self, name: &str) -> Option<Arc<dyn VectorizedIndicator>> {
        self.indicators
            .iter()
            .find(|ind| ind.outputs().iter().any(|column| *column == name))
            .or_else(|| self.indicators.iter().find(|ind| ind.alias() == name))
            .cloned()
    }

    pub fn get_indicators(&self) -> &[Arc<dyn VectorizedIndicator>] {
        &self.indicators
    }

    /// Union of every indicator's input columns, first-seen order.
    pub fn required_columns(&self) -> Vec<&'static str> {
        let mut required: Vec<&'static str> = Vec::new();
        for input in self.indicators.iter().flat_map(|ind| ind.inputs()) {
            if !required.contains(&input) {
                required.push(input);
            }
        }
        required
    }

    pub fn output_columns(&self) -> Vec<&'static str> {
        self.indicators.iter().flat_map(|ind| ind.outputs()).collect()
    }

    fn register_indicators(&mut self, config: &IndicatorConfig) {
        let indicators: Vec<Arc<dyn VectorizedIndicator>> = vec![
            Arc::new(SMA::new(config.sma_fast_period, columns::SMA20)),
            Arc::new(SMA::new(config.sma_slow_period, columns::SMA50)),
            Arc::new(MACD::new(
                config.macd_fast_period,
                config.macd_slow_period,
                config.macd_signal_period,
            )),
            Arc::new(RSI::new(config.rsi_period)),
            Arc::new(BollingerBands::new(config.bb_period, config.bb_deviation)),
            Arc::new(ATR::new(config.atr_period)),
            Arc::new(Stochastic::new(config.stoch_k_period, config.stoch_d_period)),
            Arc::new(ROC::new(config.roc_period)),
            Arc::new(VWAP::new()),
            Arc::new(CRSI::new(config.crsi_period)),
        ];

        self.indicators.extend(indicators);
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new(&IndicatorConfig::default())
    }
}
