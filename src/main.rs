//! Chart Recovery
//!
//! Batch command-line front end: discovers chart images, runs the recovery
//! pipeline on a worker pool, and writes per-chart series plus a summary.

mod cli;

use anyhow::{Context, Result};
use std::process::ExitCode;

use chart_recovery::config::PipelineConfig;
use chart_recovery::logging;
use chart_recovery::paths::{self, OutputLayout};
use chart_recovery::pipeline::{self, ChartStatus};
use cli::{CliArgs, Command};

const EXIT_USAGE: u8 = 2;

fn run(args: &CliArgs, layout: &OutputLayout) -> Result<()> {
    let config_path = args.config.clone().unwrap_or_else(paths::default_config_path);
    let mut config = PipelineConfig::load(&config_path);
    args.apply_overrides(&mut config);
    config.validate().context("Invalid configuration")?;

    layout
        .ensure_directories(config.output.debug)
        .with_context(|| format!("Failed to create output tree under {}", layout.root().display()))?;

    let jobs = pipeline::discover_charts(&args.inputs, args.anchors.as_deref())?;
    if jobs.is_empty() {
        log::warn!("No .webp or .png charts found in the given inputs");
    }

    let reports = pipeline::run_batch(jobs, &config, layout);
    let summary = pipeline::write_summary(reports, layout)?;

    for report in &summary.charts {
        let detail = match report.status {
            ChartStatus::Success => format!("{} years", report.final_series().len()),
            ChartStatus::Empty => "no data recoverable".to_string(),
            ChartStatus::Failed => report.error.clone().unwrap_or_default(),
        };
        println!("{:<32} {:<8} {}", report.slug, report.status.as_str(), detail);
    }
    println!(
        "{} charts: {} ok, {} empty, {} failed",
        summary.total, summary.succeeded, summary.empty, summary.failed
    );
    Ok(())
}

fn main() -> ExitCode {
    logging::install_panic_hook();

    let args = match cli::parse_args(std::env::args().skip(1)) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help) => {
            println!("{}", cli::HELP);
            return ExitCode::SUCCESS;
        }
        Ok(Command::WriteConfig(path)) => {
            return match PipelineConfig::save_default(&path) {
                Ok(()) => {
                    println!("Default config written to {}", path.display());
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    ExitCode::from(EXIT_USAGE)
                }
            };
        }
        Err(e) => {
            eprintln!("Error: {:#}\n\n{}", e, cli::HELP);
            return ExitCode::from(EXIT_USAGE);
        }
    };

    let layout = OutputLayout::new(&args.out);
    let log_path = layout.logs_dir().join("chart_recovery.log");
    if let Err(e) = logging::init_logging(Some(&log_path), args.verbose) {
        eprintln!("Logger already initialised: {}", e);
    }
    log::info!("Chart recovery starting ({} inputs)", args.inputs.len());

    match run(&args, &layout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::from(EXIT_USAGE)
        }
    }
}
