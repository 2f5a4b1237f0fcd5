// SampleRig - S32K Analog Peripheral Simulation Bench
// Copyright (C) 2026 SampleRig contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::Context;
use clap::{Parser, Subcommand};
use samplerig_config::{BenchDescriptor, StimulusScript, StimulusStep};
use samplerig_core::bench::Bench;
use samplerig_core::bus::SystemBus;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info};

const EXIT_PASS: u8 = 0;
const EXIT_ASSERT_FAIL: u8 = 1;
const EXIT_CONFIG_ERROR: u8 = 2;
const EXIT_RUNTIME_ERROR: u8 = 3;

const RESULT_SCHEMA_VERSION: &str = "1.0";

#[derive(Parser, Debug)]
#[command(author, version, about = "SampleRig Analog Bench", long_about = None)]
struct Cli {
    /// Enable step-level execution tracing
    #[arg(short, long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Deterministic, CI-friendly runner driven by a stimulus script (YAML).
    Run(RunArgs),

    /// Print the address map of a bench descriptor.
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Path to the bench descriptor (YAML)
    #[arg(short = 'b', long)]
    bench: PathBuf,

    /// Path to the stimulus script (YAML)
    #[arg(short = 'c', long)]
    script: PathBuf,

    /// Directory to write run artifacts (result.json)
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Path to the bench descriptor (YAML)
    #[arg(short = 'b', long)]
    bench: PathBuf,

    /// Also dump each peripheral's reset-state snapshot as JSON
    #[arg(long)]
    state: bool,
}

#[derive(Debug, Serialize)]
struct RunResult {
    result_schema_version: String,
    status: String,
    steps_executed: u64,
    cycles: u64,
    failures: Vec<ExpectationFailure>,
    script_hash: String,
    config: RunConfig,
}

#[derive(Debug, Serialize)]
struct ExpectationFailure {
    step: usize,
    expectation: StimulusStep,
    observed: String,
}

#[derive(Debug, Serialize)]
struct RunConfig {
    bench: PathBuf,
    script: PathBuf,
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

    match cli.command {
        Commands::Run(args) => run_script(args),
        Commands::Inspect(args) => inspect_bench(args),
    }
}

fn run_script(args: RunArgs) -> ExitCode {
    let descriptor = match BenchDescriptor::from_file(&args.bench) {
        Ok(d) => d,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let script = match StimulusScript::from_file(&args.script) {
        Ok(s) => s,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let mut bench = match Bench::from_config(&descriptor) {
        Ok(b) => b,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    info!(
        "Running {} steps against bench '{}'",
        script.steps.len(),
        descriptor.name
    );

    // Sample file paths in the script resolve against the script itself.
    let script_dir = args
        .script
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut failures = Vec::new();
    let mut steps_executed = 0u64;

    for (index, step) in script.steps.iter().enumerate() {
        let n = index + 1;
        if let Err(e) = execute_step(&mut bench, &script_dir, n, step, &mut failures) {
            error!("Step {} failed: {:#}", n, e);
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        }
        steps_executed += 1;
    }

    for failure in &failures {
        error!(
            "Step {}: expected {:?}, observed {}",
            failure.step, failure.expectation, failure.observed
        );
    }

    let status = if failures.is_empty() { "pass" } else { "fail" };
    let result = RunResult {
        result_schema_version: RESULT_SCHEMA_VERSION.to_string(),
        status: status.to_string(),
        steps_executed,
        cycles: bench.total_cycles(),
        failures,
        script_hash: hash_file(&args.script),
        config: RunConfig {
            bench: args.bench.clone(),
            script: args.script.clone(),
        },
    };

    match serde_json::to_string(&result) {
        Ok(line) => println!("{}", line),
        Err(e) => {
            error!("Failed to serialize run result: {}", e);
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        }
    }

    if let Some(dir) = &args.output_dir {
        if let Err(e) = write_result_artifact(dir, &result) {
            error!("{:#}", e);
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        }
    }

    if result.failures.is_empty() {
        ExitCode::from(EXIT_PASS)
    } else {
        ExitCode::from(EXIT_ASSERT_FAIL)
    }
}

fn execute_step(
    bench: &mut Bench,
    script_dir: &Path,
    n: usize,
    step: &StimulusStep,
    failures: &mut Vec<ExpectationFailure>,
) -> anyhow::Result<()> {
    match step {
        StimulusStep::Feed {
            peripheral,
            channel,
            value,
            repeat,
        } => {
            let adc = bench.bus.adc_mut(peripheral).ok_or_else(|| {
                anyhow::anyhow!("Step {}: no ADC named '{}' on this bench", n, peripheral)
            })?;
            adc.feed(*channel, *value, *repeat)?;
        }
        StimulusStep::FeedFile {
            peripheral,
            channel,
            path,
            repeat,
        } => {
            let resolved = script_dir.join(path);
            let adc = bench.bus.adc_mut(peripheral).ok_or_else(|| {
                anyhow::anyhow!("Step {}: no ADC named '{}' on this bench", n, peripheral)
            })?;
            adc.feed_from_file(*channel, &resolved, *repeat)?;
        }
        StimulusStep::Write { address, value } => {
            bench.bus.write_u32(*address, *value)?;
        }
        StimulusStep::Read { address } => {
            let value = bench.bus.read_u32(*address)?;
            info!("read {:#010x} -> {:#010x}", address, value);
        }
        StimulusStep::Run { cycles } => {
            bench.run_cycles(*cycles);
        }
        StimulusStep::Reset => {
            bench.reset();
        }
        StimulusStep::Expect {
            address,
            value,
            mask,
        } => {
            let mask = mask.unwrap_or(u32::MAX);
            let observed = bench.bus.read_u32(*address)?;
            if observed & mask != value & mask {
                failures.push(ExpectationFailure {
                    step: n,
                    expectation: step.clone(),
                    observed: format!("{:#010x}", observed),
                });
            }
        }
        StimulusStep::ExpectReady { peripheral, ready } => {
            let adc = bench.bus.adc(peripheral).ok_or_else(|| {
                anyhow::anyhow!("Step {}: no ADC named '{}' on this bench", n, peripheral)
            })?;
            let observed = adc.is_result_ready();
            if observed != *ready {
                failures.push(ExpectationFailure {
                    step: n,
                    expectation: step.clone(),
                    observed: observed.to_string(),
                });
            }
        }
    }
    Ok(())
}

fn hash_file(path: &Path) -> String {
    match std::fs::read(path) {
        Ok(bytes) => {
            let mut hasher = Sha256::new();
            hasher.update(&bytes);
            format!("{:x}", hasher.finalize())
        }
        Err(e) => {
            error!("Failed to read {:?} for hashing: {}", path, e);
            String::new()
        }
    }
}

fn write_result_artifact(dir: &Path, result: &RunResult) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output dir {:?}", dir))?;
    let path = dir.join("result.json");
    let f = std::fs::File::create(&path).with_context(|| format!("Failed to create {:?}", path))?;
    serde_json::to_writer_pretty(f, result).with_context(|| format!("Failed to write {:?}", path))?;
    Ok(())
}

fn inspect_bench(args: InspectArgs) -> ExitCode {
    let descriptor = match BenchDescriptor::from_file(&args.bench) {
        Ok(d) => d,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    let bus = match SystemBus::from_config(&descriptor) {
        Ok(b) => b,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
    };

    println!("bench: {}", descriptor.name);
    for p in &bus.peripherals {
        match p.irq {
            Some(irq) => println!(
                "  {:<8} {:#010x}..{:#010x} irq {}",
                p.name,
                p.base,
                p.base + p.size,
                irq
            ),
            None => println!("  {:<8} {:#010x}..{:#010x}", p.name, p.base, p.base + p.size),
        }
    }

    if args.state {
        for p in &bus.peripherals {
            match serde_json::to_string_pretty(&p.dev.snapshot()) {
                Ok(text) => println!("{}:\n{}", p.name, text),
                Err(e) => {
                    error!("Failed to serialize snapshot for '{}': {}", p.name, e);
                    return ExitCode::from(EXIT_RUNTIME_ERROR);
                }
            }
        }
    }

    ExitCode::from(EXIT_PASS)
}
