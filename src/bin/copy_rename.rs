use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use techsignal::config::ConfigManager;
use techsignal::utils::FileCopier;

/// Copy matching files into one flat directory as `<stem>_<ext>.txt`.
#[derive(Parser, Debug)]
#[command(name = "copy_rename")]
struct Args {
    /// Directory to copy from.
    source: PathBuf,

    /// Directory to copy into; created if missing.
    destination: PathBuf,

    /// TOML configuration file with a `[copier]` section.
    #[arg(long)]
    config: Option<PathBuf>,
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

    let report = FileCopier::new(manager.get().copier).run(&args.source, &args.destination)?;
    println!(
        "Files have been copied and renamed in {} ({} copied, {} skipped, {} failed)",
        args.destination.display(),
        report.copied.len(),
        report.skipped,
        report.failed.len()
    );
    Ok(())
}
