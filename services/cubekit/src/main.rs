//! Data cube command-line tool.
//!
//! `cubekit new` writes template cubes into Zarr stores and
//! `cubekit verify` checks a store against the cube conventions.

mod config_loader;
mod report;
mod samples;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level as LogLevel};
use tracing_subscriber::FmtSubscriber;

use cube_generator::{new_dataset, CubeConfig};
use cube_store::{open_dataset, StoreConfig, ZarrDatasetWriter};
use cube_verify::{Level, Verifier};

#[derive(Parser, Debug)]
#[command(name = "cubekit")]
#[command(about = "Generate and verify data cubes")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn", env = "CUBEKIT_LOG_LEVEL")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Verify given dataset conforms to the cube conventions.
    Verify {
        /// Path of the dataset store
        #[arg(value_name = "DATASET")]
        dataset: PathBuf,

        /// Lowest severity to report (warning or error)
        #[arg(long, default_value = "error")]
        level: Level,

        /// Print issues as JSON
        #[arg(long)]
        json: bool,

        /// Evaluate rules in parallel
        #[arg(long)]
        parallel: bool,
    },

    /// Generate sample datasets.
    ///
    /// Without --config, writes dataset_global.zarr and dataset_utm33n.zarr.
    New {
        /// Directory to write the stores into
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// YAML cube configuration; writes a single store named after the file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_tracing(&args.log_level, args.log_json)?;

    match args.command {
        Command::Verify {
            dataset,
            level,
            json,
            parallel,
        } => run_verify(&dataset, level, json, parallel),
        Command::New { output_dir, config } => {
            run_new(&output_dir, config.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => LogLevel::TRACE,
        "debug" => LogLevel::DEBUG,
        "info" => LogLevel::INFO,
        "warn" => LogLevel::WARN,
        "error" => LogLevel::ERROR,
        _ => LogLevel::WARN,
    };

    // Logs go to stderr so stdout carries only the report.
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn run_verify(path: &Path, level: Level, json: bool, parallel: bool) -> Result<ExitCode> {
    let dataset = open_dataset(path)
        .with_context(|| format!("Failed to open dataset {}", path.display()))?;

    let verifier = Verifier::new();
    let issues = if parallel {
        verifier.verify_parallel(&dataset, level)
    } else {
        verifier.verify(&dataset, level)
    };

    if json {
        println!("{}", report::json_report(&issues)?);
    } else {
        for line in report::text_report(&issues) {
            println!("{}", line);
        }
    }

    if report::has_errors(&issues) {
        eprintln!("Error: Dataset is not compliant");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn run_new(output_dir: &Path, config_path: Option<&Path>) -> Result<()> {
    let targets: Vec<(String, CubeConfig)> = match config_path {
        Some(path) => {
            let config = config_loader::load_cube_config(path)?;
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("dataset");
            vec![(format!("{}.zarr", stem), config)]
        }
        None => samples::all()?
            .into_iter()
            .map(|(name, config)| (name.to_string(), config))
            .collect(),
    };

    let store_config = StoreConfig::from_env();
    store_config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid store configuration: {}", e))?;
    let writer = ZarrDatasetWriter::new(store_config);

    for (name, config) in targets {
        let path = output_dir.join(&name);
        println!("Writing {}...", path.display());
        let dataset = new_dataset(&config)
            .with_context(|| format!("Failed to create dataset {}", name))?;
        let summary = writer
            .write_to_path(&dataset, &path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!(
            path = %path.display(),
            arrays = summary.arrays,
            bytes_written = summary.bytes_written,
            "Dataset written"
        );
    }
    Ok(())
}
