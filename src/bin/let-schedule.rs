//! let-schedule: schedule a LET system and export its job, dependency
//! and event-chain instances.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};

use cause_effect_analysis::config::{ExecutionModel, InvariantPolicy};
use cause_effect_analysis::letsync::{reaction_times_from_export, schedule_system, LetSystem};
use cause_effect_analysis::AnalysisConfig;

/// Per-job execution demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Execution {
    /// Every job runs for its WCET.
    Wcet,
    /// Uniform in [BCET, WCET], drawn from the seeded generator.
    Uniform,
}

/// Schedule a LET system under fixed-priority scheduling.
#[derive(Parser)]
#[command(name = "let-schedule")]
struct Cli {
    /// Path to a LET system JSON file.
    system: PathBuf,

    /// Where to write the schedule (stdout if omitted).
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// JSON file with analysis settings; flags override its values.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Seed of the execution-time generator.
    #[arg(long, env = "LET_SCHEDULE_SEED")]
    seed: Option<u64>,

    /// How execution demand is chosen.
    #[arg(long, value_enum)]
    execution: Option<Execution>,

    /// Ticks per time unit of the system file.
    #[arg(long)]
    time_scale: Option<f64>,

    /// Log a failed bound cross-check instead of aborting.
    #[arg(long)]
    lenient: bool,

    /// Re-derive reaction times from the export and print them to stderr.
    #[arg(long)]
    verify: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(&cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn load_config(cli: &Cli) -> Result<AnalysisConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            AnalysisConfig::from_json(&json)
                .with_context(|| format!("invalid configuration in {}", path.display()))?
        }
        None => AnalysisConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    match cli.execution {
        Some(Execution::Wcet) => config.execution = ExecutionModel::WorstCase,
        Some(Execution::Uniform) => config.execution = ExecutionModel::Uniform,
        None => {}
    }
    if let Some(scale) = cli.time_scale {
        config.time_scale = scale;
    }
    if cli.lenient {
        config.invariant_policy = InvariantPolicy::Log;
    }
    config.validate()?;
    Ok(config)
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    let json = std::fs::read_to_string(&cli.system)
        .with_context(|| format!("failed to read {}", cli.system.display()))?;
    let system: LetSystem = serde_json::from_str(&json)
        .with_context(|| format!("failed to parse {}", cli.system.display()))?;
    if system.tasks.is_empty() {
        bail!("{} contains no tasks", cli.system.display());
    }

    let schedule = schedule_system(&system, &config).context("scheduling failed")?;

    if cli.verify {
        for (chain, reaction) in reaction_times_from_export(&schedule, &config)? {
            eprintln!("{chain}: reaction time {reaction}");
        }
    }

    let out = serde_json::to_string_pretty(&schedule)?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, out)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("wrote schedule to {}", path.display());
        }
        None => println!("{out}"),
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
