use crate::{
    config::IndicatorConfig,
    error::{Result, TechSignalError},
    functions::registry::FunctionRegistry,
};
use polars::prelude::*;
use std::sync::Arc;

/// Appends the indicator battery to a prepared price table.
pub struct IndicatorEngine {
    registry: Arc<FunctionRegistry>,
}

impl IndicatorEngine {
    pub fn new(config: &IndicatorConfig) -> Self {
        Self::with_registry(Arc::new(FunctionRegistry::new(config)))
    }

    pub fn with_registry(registry: Arc<FunctionRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn required_columns(&self) -> Vec<&'static str> {
        self.registry.required_columns()
    }

    /// Returns a copy of `df` with every indicator column added.
    ///
    /// Fails before computing anything if an input column is missing or has no values.
    pub fn calculate(&self, df: &DataFrame) -> Result<DataFrame> {
        self.check_inputs(df)?;

        let mut exprs = Vec::new();
        for indicator in self.registry.get_indicators() {
            let args: Vec<Expr> = indicator
                .inputs()
                .iter()
                .map(|name| col(*name).cast(DataType::Float64))
                .collect();

            let outputs = indicator.calculate_vectorized(&args).map_err(|e| {
                TechSignalError::IndicatorError(format!("{}: {}", indicator.alias(), e))
            })?;
            log::debug!(
                "{} -> {:?} (warm-up {} rows)",
                indicator.alias(),
                indicator.outputs(),
                indicator.warmup()
            );
            exprs.extend(outputs);
        }

        // Undefined divisions surface as nulls, never NaN
        let cleanup: Vec<Expr> = self
            .registry
            .output_columns()
            .into_iter()
            .map(|name| col(name).fill_nan(lit(NULL)))
            .collect();

        let result = df
            .clone()
            .lazy()
            .with_columns(exprs)
            .with_columns(cleanup)
            .collect()
            .map_err(|e| TechSignalError::Computation(format!("Indicator evaluation failed: {}", e)))?;

        log::info!(
            "Computed {} indicator columns over {} rows",
            self.registry.output_columns().len(),
            result.height()
        );
        Ok(result)
    }

    fn check_inputs(&self, df: &DataFrame) -> Result<()> {
        for name in self.required_columns() {
            let column = df.column(name).map_err(|_| TechSignalError::MissingColumn {
                column: name.to_string(),
            })?;
            if column.null_count() == column.len() {
                return Err(TechSignalError::DataUnavailable(format!(
                    "Column '{}' has no values",
                    name
                )));
            }
        }
        Ok(())
    }
}
