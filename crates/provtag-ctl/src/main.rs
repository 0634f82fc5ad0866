//! provtagctl - inspect provisioner tag admission and routing
//!
//! Usage:
//!   provtagctl normalize --user <uuid> --tag scope=user --tag region=us
//!   provtagctl normalize --file job.json
//!   provtagctl route --job job.json --provisioners provisioners.json
//!   provtagctl validate --file descriptor.json
mod commands;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use provtag_core::admission::Admission;
use provtag_observe::{LoggerConfig, LoggerFormat, LoggerLevel, init_logger};
use provtag_prometheus::PrometheusMetrics;

use crate::commands::{NormalizeArgs, RouteArgs, ValidateArgs};

#[derive(Parser)]
#[command(name = "provtagctl")]
#[command(about = "Provisioner tag normalization and routing", long_about = None)]
struct Cli {
    /// Log filter directive (overrides PROVTAG_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format: text, json, journald
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// Print collected prometheus metrics to stderr on exit
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the canonical descriptor of a job or provisioner
    Normalize(NormalizeArgs),

    /// Rank provisioners eligible for a job
    Route(RouteArgs),

    /// Check that a persisted descriptor is canonical
    Validate(ValidateArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = LoggerConfig::default().with_env()?;
    if let Some(level) = &cli.log_level {
        cfg.level = LoggerLevel::new(level.as_str())?;
    }
    if let Some(format) = &cli.log_format {
        cfg.format = format.parse::<LoggerFormat>()?;
    }
    init_logger(&cfg)?;
    debug!(format = %cfg.format, level = cfg.level.as_str(), "logger initialized");

    let metrics = PrometheusMetrics::new()?;
    let admission = Admission::new().with_metrics(Arc::new(metrics.clone()));

    let output = match &cli.command {
        Commands::Normalize(args) => commands::normalize(&admission, args)?,
        Commands::Route(args) => commands::route(&admission, args)?,
        Commands::Validate(args) => commands::validate(args)?,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    if cli.metrics {
        eprint!("{}", commands::render_metrics(&metrics)?);
    }
    Ok(())
}
