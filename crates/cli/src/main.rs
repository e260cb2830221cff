//! Five-stage pipeline simulator CLI.
//!
//! This binary runs one instruction trace through the pipeline. It performs:
//! 1. **Configuration:** Built-in defaults, optionally a JSON config file, then
//!    command-line overrides (predictor, forwarding, cycle ceiling).
//! 2. **Simulation:** Loads the trace and steps the pipeline until HALT reaches
//!    writeback or the cycle ceiling is hit, streaming the timeline to CSV.
//! 3. **Reporting:** Prints the run summary and statistics, or the metrics as
//!    JSON with `--json`.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use pipesim_core::config::{BranchPredictorKind, Config};
use pipesim_core::core::units::bru::{BranchPredictor, BranchPredictorWrapper};
use pipesim_core::sim::{Simulator, TimelineWriter, loader};
use pipesim_core::{RunSummary, SimError};

#[derive(Parser, Debug)]
#[command(
    name = "pipesim",
    author,
    version,
    about = "In-order 5-stage pipeline simulator",
    long_about = "Run an instruction trace through an IF/ID/EX/MEM/WB pipeline and report CPI, \
                  stalls and branch prediction accuracy.\n\n\
                  Predictors:\n  static_nt | static_t | 1bit | 2bit | tournament\n\n\
                  Examples:\n  \
                  pipesim --trace traces/sample.trace\n  \
                  pipesim --trace loop.trace --predictor 2bit --no-forwarding\n  \
                  pipesim --config sim.json --json"
)]
struct Cli {
    /// Instruction trace to simulate.
    #[arg(short, long, default_value = "traces/sample.trace")]
    trace: PathBuf,

    /// Where to write the per-cycle timeline CSV.
    #[arg(short, long, default_value = "data/timeline.csv")]
    out: PathBuf,

    /// Branch predictor (overrides the config file). Unknown names fall back to static_nt.
    #[arg(short, long)]
    predictor: Option<String>,

    /// Disable operand forwarding.
    #[arg(long)]
    no_forwarding: bool,

    /// Cycle ceiling (overrides the config file).
    #[arg(long)]
    max_cycles: Option<u64>,

    /// JSON configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the metrics as JSON instead of the text report.
    #[arg(long)]
    json: bool,

    /// Log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    let config = match cli.config.as_ref().map(Config::from_json_file).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => fail(&e),
    };
    init_logging(cli.verbose, config.general.trace);
    let config = apply_overrides(config, &cli);

    match cmd_run(&cli, &config) {
        Ok(summary) => report(&cli, &summary),
        Err(e) => fail(&e),
    }
}

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` wins; otherwise `-v`/`-vv` or `general.trace` in the config pick
/// the level.
fn init_logging(verbose: u8, trace: bool) {
    let level = match (verbose, trace) {
        (_, true) | (2.., _) => "trace",
        (1, false) => "debug",
        (0, false) => "warn",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Layers command-line flags over the loaded configuration.
fn apply_overrides(mut config: Config, cli: &Cli) -> Config {
    if let Some(name) = cli.predictor.as_deref() {
        config.pipeline.branch_predictor = BranchPredictorKind::from_name(name);
    }
    if cli.no_forwarding {
        config.pipeline.forwarding = false;
    }
    if let Some(max_cycles) = cli.max_cycles {
        config.general.max_cycles = max_cycles;
    }
    config
}

/// Loads the trace, runs it to completion and writes the timeline.
fn cmd_run(cli: &Cli, config: &Config) -> Result<RunSummary, SimError> {
    let program = loader::load_trace(&cli.trace)?;
    if !cli.json {
        println!("Loaded {} instructions", program.len());
    }

    debug!(
        predictor = config.pipeline.branch_predictor.short_name(),
        forwarding = config.pipeline.forwarding,
        max_cycles = config.general.max_cycles,
        "configuration resolved"
    );
    let mut predictor = BranchPredictorWrapper::new(config.pipeline.branch_predictor);
    let predictor: &mut dyn BranchPredictor = &mut predictor;
    let mut sim = Simulator::from_config(&program, config, Some(predictor));

    let mut timeline = TimelineWriter::create(&cli.out)?;
    let summary = sim
        .run(|record| timeline.write_record(record))
        .map_err(|e| SimError::io(&cli.out, e))?;
    let _ = timeline.finish().map_err(|e| SimError::io(&cli.out, e))?;

    Ok(summary)
}

/// Prints the run outcome to stdout.
fn report(cli: &Cli, summary: &RunSummary) {
    if cli.json {
        match serde_json::to_string_pretty(summary) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("[!] could not serialize metrics: {e}");
                process::exit(1);
            }
        }
        return;
    }

    println!("Done. {summary}");
    if !summary.halted {
        println!("[*] Stopped at the cycle ceiling before HALT reached writeback");
    }
    println!("Timeline CSV: {}", cli.out.display());
    println!();
    summary.metrics().print();
}

/// Reports a fatal error and exits with status 1.
fn fail(err: &SimError) -> ! {
    eprintln!("[!] FATAL: {err}");
    process::exit(1);
}
