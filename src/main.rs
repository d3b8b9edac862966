//! Command-line driver of the multi-lepton selection job

use clap::Parser;
use eyre::{ensure, WrapErr};
use tracing::info;

use vlq_select::{
    config::Configuration, input, job::Job, logging, output, plugin::Registry, Result,
};

use std::{fs::File, path::PathBuf, time::Instant};

/// Run the event selection and truth tagging over a JSON-lines event dump
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = "ljmet.cfg")]
    config: PathBuf,

    /// Input events, one JSON object per line
    input: PathBuf,

    /// Where per-event outcomes are written as JSON lines
    #[arg(short, long, default_value = "outcomes.jsonl")]
    output: PathBuf,

    /// Where the cutflow report is written
    #[arg(short, long, default_value = "cutflow.txt")]
    report: PathBuf,

    /// Emit the per-event debug trace
    #[arg(short, long)]
    verbose: bool,
}

/// This will act as our main function, with suitable error handling
fn main() -> Result<()> {
    let cli = Cli::parse();

    // ### CONFIGURATION READOUT ###

    let cfg = Configuration::load(&cli.config).wrap_err("Failed to load the configuration")?;
    logging::init(cli.verbose || cfg.selector_config.debug || cfg.classifier.debug);

    // ### JOB INITIALIZATION ###

    let registry = Registry::with_builtins();
    let job = Job::new(&cfg, &registry)?;
    let events = input::load_events(&cli.input)?;
    ensure!(!events.is_empty(), "No event found in {}", cli.input.display());
    info!("Loaded {} events from {}", events.len(), cli.input.display());

    // ### JOB EXECUTION ###

    // The clock starts after configuration and input I/O, to avoid
    // IO-induced timing fluctuations
    let saved_time = Instant::now();
    let results = job.run(&events)?;
    let elapsed_time = saved_time.elapsed();

    // ### RESULTS DISPLAY AND STORAGE ###

    let outcomes_file = File::create(&cli.output)
        .wrap_err_with(|| format!("Failed to create {}", cli.output.display()))?;
    output::write_outcomes(outcomes_file, &results.outcomes)?;
    output::dump_cutflow(&cfg, &results, elapsed_time, &cli.report)
        .wrap_err("Failed to output the cutflow")?;

    // ...and we're done
    Ok(())
}
