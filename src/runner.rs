use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use clap::Parser;
use log::info;

use crate::engine::SimulationEngine;
use crate::error::SimError;
use crate::log::{set_log_level, LevelFilter};
use crate::parameters::SimulationConfig;
use crate::report::write_reports;

/// Default cli arguments for the simulation runner
#[derive(Parser, Debug, Default)]
#[command(name = "zombie-sim", version, about)]
pub struct BaseArgs {
    /// Random seed; overrides the seed in the config file
    #[arg(short, long)]
    pub random_seed: Option<u64>,

    /// Optional path for a JSON simulation config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Optional directory for report output
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Enable logging at the given level (error, warn, info, debug, trace)
    #[arg(short, long, value_parser = parse_log_level)]
    pub log_level: Option<LevelFilter>,

    /// Number of days to simulate; overrides the config file
    #[arg(short, long)]
    pub days: Option<u64>,

    /// Multiplier applied to beta on lockdown days; overrides the config file
    #[arg(long)]
    pub lockdown_scale: Option<f64>,
}

fn parse_log_level(level: &str) -> Result<LevelFilter, String> {
    LevelFilter::from_str(level).map_err(|_| format!("unknown log level: {level}"))
}

/// Runs a simulation configured from command line arguments.
///
/// `setup_fn` may adjust the config after the file and command line overrides are applied and
/// before it is validated.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded, is invalid, or reports cannot be written.
pub fn run_with_args<F>(setup_fn: F) -> Result<SimulationEngine, SimError>
where
    F: FnOnce(&mut SimulationConfig, &BaseArgs) -> Result<(), SimError>,
{
    run_with_args_internal(BaseArgs::parse(), setup_fn)
}

fn load_config(args: &BaseArgs) -> Result<SimulationConfig, SimError> {
    let mut config = match &args.config {
        Some(path) => {
            info!("loading simulation config from {}", path.display());
            SimulationConfig::load_from_json(path)?
        }
        None => SimulationConfig::default(),
    };

    if let Some(seed) = args.random_seed {
        config.seed = Some(seed);
    }
    if let Some(days) = args.days {
        config.days = days;
    }
    if let Some(scale) = args.lockdown_scale {
        config.lockdown.beta_scale = scale;
    }
    Ok(config)
}

fn run_with_args_internal<F>(args: BaseArgs, setup_fn: F) -> Result<SimulationEngine, SimError>
where
    F: FnOnce(&mut SimulationConfig, &BaseArgs) -> Result<(), SimError>,
{
    if let Some(level) = args.log_level {
        set_log_level(level);
    }

    let mut config = load_config(&args)?;
    setup_fn(&mut config, &args)?;

    let policy = Arc::new(config.lockdown.policy_set());
    let mut engine = SimulationEngine::from_config(config, policy)?;
    engine.run()?;

    if let Some(output_dir) = &args.output_dir {
        write_reports(&engine, output_dir)?;
        info!("reports written to {}", output_dir.display());
    }
    Ok(engine)
}
