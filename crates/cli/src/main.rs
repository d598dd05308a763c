// PicoMark - Deterministic Workload Benchmark
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

use picomark_config::{parse_seed, Algorithm, DataSize, Preset, RunConfig, RunParams};
use picomark_core::platform::check_data_types;
use picomark_core::{
    Controller, CoreError, MonotonicClock, Report, StdoutSink, Verdict, Workload,
};

const EXIT_PASS: u8 = 0;
const EXIT_ASSERT_FAIL: u8 = 1;
const EXIT_CONFIG_ERROR: u8 = 2;
const EXIT_RUNTIME_ERROR: u8 = 3;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "PicoMark deterministic workload benchmark",
    long_about = None
)]
struct Cli {
    /// Path to a run file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Standard run shape: performance, validation or profile
    #[arg(long)]
    preset: Option<Preset>,

    /// First seed (decimal or 0x hex). Drives every generator.
    #[arg(long, value_parser = parse_seed, allow_negative_numbers = true)]
    seed1: Option<i32>,

    /// Second seed. Mixed into the matrix seed and the second state pass.
    #[arg(long, value_parser = parse_seed, allow_negative_numbers = true)]
    seed2: Option<i32>,

    /// Third seed: number of list lookups per pass.
    #[arg(long, value_parser = parse_seed, allow_negative_numbers = true)]
    seed3: Option<i32>,

    /// Iterations to measure. 0 calibrates automatically.
    #[arg(short, long)]
    iterations: Option<u32>,

    /// Comma-separated kernels to enable (list,matrix,state)
    #[arg(long, value_delimiter = ',')]
    algorithms: Vec<Algorithm>,

    /// Total arena bytes per instance (e.g. 2000, "6 kB")
    #[arg(long)]
    data_size: Option<String>,

    /// Independent instances to run side by side (1 or 2)
    #[arg(long)]
    contexts: Option<u32>,

    /// Length of one calibration time unit in milliseconds
    #[arg(long)]
    unit_ms: Option<u64>,

    /// Time units the measurement is scaled towards
    #[arg(long)]
    target_units: Option<u64>,

    /// Shorter measurements are reported as errors
    #[arg(long)]
    min_valid_ms: Option<u64>,

    /// Write the report as JSON to this path
    #[arg(long)]
    json: Option<PathBuf>,

    /// Enable debug logging (calibration probes, kernel setup)
    #[arg(short, long)]
    trace: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing with appropriate level based on --trace flag
    if cli.trace {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .init();
    }

    let params = match build_params(&cli) {
        Ok(params) => params,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    if let Err(e) = check_data_types() {
        error!("{}", e);
        return ExitCode::from(exit_code_for(&e));
    }

    run(&cli, &params)
}

fn build_params(cli: &Cli) -> anyhow::Result<RunParams> {
    let mut config = match &cli.config {
        Some(path) => RunConfig::from_file(path)?,
        None => RunConfig::default(),
    };

    if let Some(preset) = cli.preset {
        config.apply_preset(preset);
    }
    if let Some(seed) = cli.seed1 {
        config.seeds.seed1 = seed;
    }
    if let Some(seed) = cli.seed2 {
        config.seeds.seed2 = seed;
    }
    if let Some(seed) = cli.seed3 {
        config.seeds.seed3 = seed;
    }
    if let Some(iterations) = cli.iterations {
        config.iterations = iterations;
    }
    if !cli.algorithms.is_empty() {
        config.algorithms = cli.algorithms.clone();
    }
    if let Some(size) = &cli.data_size {
        config.data_size = DataSize::Text(size.clone());
    }
    if let Some(contexts) = cli.contexts {
        config.contexts = contexts;
    }
    if let Some(unit_ms) = cli.unit_ms {
        config.timing.unit_ms = unit_ms;
    }
    if let Some(target_units) = cli.target_units {
        config.timing.target_units = target_units;
    }
    if let Some(min_valid_ms) = cli.min_valid_ms {
        config.timing.min_valid_ms = min_valid_ms;
    }

    config.resolve()
}

/// Set-up mistakes and unsuitable hosts are configuration errors; anything
/// that fails once the kernels are running is a runtime error.
fn exit_code_for(e: &CoreError) -> u8 {
    match e {
        CoreError::RegionTooSmall { .. }
        | CoreError::NoAlgorithms
        | CoreError::ListRequired
        | CoreError::NoContexts
        | CoreError::DataTypes(_) => EXIT_CONFIG_ERROR,
        CoreError::ArenaExhausted { .. } | CoreError::InvalidPhase { .. } => EXIT_RUNTIME_ERROR,
    }
}

fn run(cli: &Cli, params: &RunParams) -> ExitCode {
    info!(
        data_size = params.data_size,
        contexts = params.contexts,
        iterations = params.iterations,
        "Starting PicoMark"
    );

    let workloads = match (0..params.contexts)
        .map(|_| Workload::new(params))
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(workloads) => workloads,
        Err(e) => {
            error!("Failed to set up workload: {}", e);
            return ExitCode::from(exit_code_for(&e));
        }
    };

    let mut controller = Controller::new(workloads, MonotonicClock, params.timing, params.iterations);
    let report = match controller.run() {
        Ok(report) => report,
        Err(e) => {
            error!("Benchmark run failed: {}", e);
            return ExitCode::from(exit_code_for(&e));
        }
    };

    report.emit(&mut StdoutSink);

    if let Some(path) = &cli.json {
        if let Err(e) = write_report(path, &report) {
            error!("{:#}", e);
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        }
        info!("Report written to {:?}", path);
    }

    match report.verdict {
        Verdict::ErrorsDetected => ExitCode::from(EXIT_ASSERT_FAIL),
        Verdict::Validated | Verdict::Unverifiable => ExitCode::from(EXIT_PASS),
    }
}

fn write_report(path: &Path, report: &Report) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {:?}", parent))?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create report file {:?}", path))?;
    serde_json::to_writer_pretty(file, report)
        .with_context(|| format!("Failed to write report to {:?}", path))?;
    Ok(())
}
