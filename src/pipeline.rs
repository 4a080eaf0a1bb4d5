use crate::{
    config::{AppConfig, ChartFormat},
    data::{DataPreparer, MarketDataSource},
    engines::{IndicatorEngine, SignalGenerator},
    error::Result,
    presentation::{ChartBuilder, SignalSummary},
    types::{columns, RowSignals},
};
use chrono::{Local, NaiveDate};
use polars::prelude::*;
use std::path::PathBuf;

/// Everything one analysis run produces
pub struct AnalysisReport {
    pub ticker: String,
    /// Prepared prices, indicators and `Signal_<family>` columns
    pub table: DataFrame,
    pub signals: Vec<RowSignals>,
    /// `None` when the most recent row has undefined indicators
    pub summary: Option<SignalSummary>,
    /// Where the chart was written, if it was
    pub chart: Option<PathBuf>,
}

/// Preparation, indicators, signals and presentation, in that order.
pub struct AnalysisPipeline<S: MarketDataSource> {
    config: AppConfig,
    preparer: DataPreparer<S>,
    engine: IndicatorEngine,
    generator: SignalGenerator,
}

impl<S: MarketDataSource> AnalysisPipeline<S> {
    pub fn new(config: AppConfig, source: S) -> Self {
        Self {
            preparer: DataPreparer::new(source, config.data.clone()),
            engine: IndicatorEngine::new(&config.indicators),
            generator: SignalGenerator::new(),
            config,
        }
    }

    /// Run for the configured ticker over the configured window.
    pub fn run(&self) -> Result<AnalysisReport> {
        let end = self
            .config
            .data
            .end_date
            .unwrap_or_else(|| Local::now().date_naive());
        self.run_for(&self.config.data.ticker, end)
    }

    pub fn run_for(&self, ticker: &str, end: NaiveDate) -> Result<AnalysisReport> {
        let prepared = self.preparer.prepare(ticker, self.config.data.days, end)?;
        let with_indicators = self.engine.calculate(&prepared)?;
        let signals = self.generator.generate(&with_indicators)?;
        let table = self.generator.to_frame(&with_indicators, &signals)?;

        let summary = match SignalSummary::from_latest(&signals) {
            Ok(summary) => Some(match Self::latest_date(&table)? {
                Some(date) => summary.on(date),
                None => summary,
            }),
            Err(e) => {
                log::warn!("No summary for {}: {}", ticker, e);
                None
            }
        };

        let chart = self.render_chart(&table, &signals, ticker);

        Ok(AnalysisReport {
            ticker: ticker.to_string(),
            table,
            signals,
            summary,
            chart,
        })
    }

    /// Chart problems are reported and the run continues without a chart.
    fn render_chart(&self, table: &DataFrame, signals: &[RowSignals], ticker: &str) -> Option<PathBuf> {
        let path = self.config.output.chart_path.clone()?;
        let builder = ChartBuilder::from_config(&self.config.output);

        let written = builder.build(table, signals, ticker).and_then(|figure| {
            match self.config.output.chart_format {
                ChartFormat::Html => figure.write_html(&path),
                ChartFormat::Json => figure.write_json(&path),
            }
        });

        match written {
            Ok(()) => {
                log::info!("Chart written to {}", path.display());
                Some(path)
            }
            Err(e) => {
                log::error!("Chart for {} not written: {}", ticker, e);
                None
            }
        }
    }

    fn latest_date(table: &DataFrame) -> Result<Option<String>> {
        if table.height() == 0 {
            return Ok(None);
        }
        let dates = table.column(columns::DATE)?.cast(&DataType::String)?;
        let latest = dates.str()?.get(table.height() - 1).map(str::to_string);
        Ok(latest)
    }
}
