use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use techsignal::config::ConfigManager;
use techsignal::data::CsvMarketData;
use techsignal::AnalysisPipeline;

/// Indicators, signals and a chart for one ticker.
#[derive(Parser, Debug)]
#[command(name = "techsignal")]
struct Args {
    /// TOML configuration file; `TECHSIGNAL__*` variables are read either way.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ticker to analyse instead of the configured one.
    ticker: Option<String>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let mut manager = ConfigManager::new();
    match &args.config {
        Some(path) => manager
            .load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => manager.load_from_env()?,
    }
    if let Some(ticker) = args.ticker {
        manager.update(|c| c.data.ticker = ticker.to_uppercase())?;
    }

    let config = manager.get();
    let source = CsvMarketData::new(&config.data.data_dir);
    let report = AnalysisPipeline::new(config, source).run()?;

    match &report.summary {
        Some(summary) => println!("{}", summary),
        None => println!(
            "No complete signal set for {} on the latest day; widen the window.",
            report.ticker
        ),
    }
    if let Some(chart) = &report.chart {
        println!("Chart: {}", chart.display());
    }

    Ok(())
}
