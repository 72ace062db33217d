//! Command-line parsing.

use anyhow::{anyhow, Result};
use std::path::PathBuf;

use chart_recovery::config::{GridStrategy, LineColor, PipelineConfig};
use chart_recovery::vision::CropProfile;

pub const HELP: &str = include_str!("cli_help.txt");

const DEFAULT_OUT_DIR: &str = "chart_output";

#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    pub inputs: Vec<PathBuf>,
    pub config: Option<PathBuf>,
    pub out: PathBuf,
    pub anchors: Option<PathBuf>,
    pub profile: Option<CropProfile>,
    pub strategy: Option<GridStrategy>,
    pub color: Option<LineColor>,
    pub workers: Option<usize>,
    pub market_size: Option<u32>,
    pub debug: bool,
    pub no_charts: bool,
    pub verbose: bool,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            inputs: Vec::new(),
            config: None,
            out: PathBuf::from(DEFAULT_OUT_DIR),
            anchors: None,
            profile: None,
            strategy: None,
            color: None,
            workers: None,
            market_size: None,
            debug: false,
            no_charts: false,
            verbose: false,
        }
    }
}

impl CliArgs {
    /// Command-line flags win over the config file.
    pub fn apply_overrides(&self, config: &mut PipelineConfig) {
        if let Some(profile) = self.profile {
            config.crop = profile;
        }
        if let Some(strategy) = self.strategy {
            config.grid.strategy = strategy;
        }
        if let Some(color) = &self.color {
            config.trend.color = color.clone();
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(size) = self.market_size {
            config.output.market_size = Some(size);
        }
        if self.debug {
            config.output.debug = true;
        }
        if self.no_charts {
            config.output.render_charts = false;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Run(CliArgs),
    WriteConfig(PathBuf),
    Help,
}

fn parse_profile(v: &str) -> Result<CropProfile> {
    match v.to_ascii_lowercase().as_str() {
        "minimal" => Ok(CropProfile::Minimal),
        "aggressive" => Ok(CropProfile::Aggressive),
        other => Err(anyhow!("Unknown crop profile: {}", other)),
    }
}

pub fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Command> {
    let mut params = CliArgs::default();
    let mut args = args.into_iter();

    while let Some(a) = args.next() {
        let mut value = |flag: &str| args.next().ok_or_else(|| anyhow!("Missing value for {}", flag));
        match a.as_str() {
            "-c" | "--config" => params.config = Some(PathBuf::from(value(&a)?)),
            "-o" | "--out" => params.out = PathBuf::from(value(&a)?),
            "-a" | "--anchors" => params.anchors = Some(PathBuf::from(value(&a)?)),
            "--profile" => params.profile = Some(parse_profile(&value(&a)?)?),
            "--strategy" => {
                let v = value(&a)?;
                params.strategy = Some(
                    GridStrategy::parse(&v).ok_or_else(|| anyhow!("Unknown grid strategy: {}", v))?,
                );
            }
            "--color" | "--colour" => {
                let v = value(&a)?;
                params.color =
                    Some(LineColor::parse(&v).ok_or_else(|| anyhow!("Unknown line colour: {}", v))?);
            }
            "-j" | "--workers" => {
                let v = value(&a)?;
                params.workers = Some(v.parse().map_err(|_| anyhow!("Invalid worker count: {}", v))?);
            }
            "--market-size" => {
                let v = value(&a)?;
                let size: u32 = v.parse().map_err(|_| anyhow!("Invalid market size: {}", v))?;
                if size == 0 {
                    return Err(anyhow!("Market size must be positive"));
                }
                params.market_size = Some(size);
            }
            "--write-config" => return Ok(Command::WriteConfig(PathBuf::from(value(&a)?))),
            "--debug" => params.debug = true,
            "--no-charts" => params.no_charts = true,
            "-v" | "--verbose" => params.verbose = true,
            "-h" | "--help" => return Ok(Command::Help),
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(anyhow!("Unknown arg: {}", flag));
            }
            _ => params.inputs.push(PathBuf::from(&a)),
        }
    }

    if params.inputs.is_empty() {
        return Err(anyhow!("No input charts given"));
    }
    Ok(Command::Run(params))
}
