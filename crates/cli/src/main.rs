//! Used-car price estimator CLI
//!
//! Trains and queries the price model, and reports market and per-model
//! statistics from a listings snapshot.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{analyze, estimate, market, train};
use estimator_lib::analysis::DEFAULT_TREND_POINTS;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Used-car price estimator
#[derive(Parser)]
#[command(name = "carprice")]
#[command(author, version, about = "Used-car price estimator and market statistics", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./carprice.toml when present)
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Listings snapshot (.parquet, otherwise CSV)
    #[arg(long, global = true, env = "CARPRICE_DATA")]
    pub data: Option<PathBuf>,

    /// Model artifact path
    #[arg(long, global = true, env = "CARPRICE_MODEL")]
    pub model_path: Option<PathBuf>,

    /// Output format
    #[arg(long, short, global = true, default_value = "table")]
    pub format: output::OutputFormat,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train the price model and overwrite the saved artifact
    Train,

    /// Estimate the price of one car
    Estimate(estimate::EstimateArgs),

    /// Market-wide statistics
    #[command(subcommand)]
    Market(MarketCommands),

    /// Statistics for one brand and model
    #[command(subcommand)]
    Analyze(AnalyzeCommands),
}

#[derive(Subcommand)]
pub enum MarketCommands {
    /// Number of listings per brand
    Brands {
        /// Show only the N most listed brands
        #[arg(long)]
        top: Option<usize>,
    },

    /// Correlations between the numeric listing columns
    Correlation,
}

#[derive(Subcommand)]
pub enum AnalyzeCommands {
    /// Mean and median price, mean mileage
    Summary {
        /// Brand (case-insensitive substring)
        #[arg(long)]
        brand: String,

        /// Model (case-insensitive substring)
        #[arg(long)]
        model: String,

        /// Restrict to one model year
        #[arg(long)]
        year: Option<i32>,
    },

    /// Quadratic price/mileage trend
    Trend {
        /// Brand (exact)
        #[arg(long)]
        brand: String,

        /// Model (exact)
        #[arg(long)]
        model: String,

        /// Points on the fitted curve
        #[arg(long, default_value_t = DEFAULT_TREND_POINTS)]
        points: usize,
    },
}

fn init_tracing(json: bool, verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout carries command output only
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json, cli.verbose);

    let config = config::load(cli.config.as_deref(), cli.data, cli.model_path)?;
    debug!(
        dataset = %config.dataset_path.display(),
        model = %config.model_path.display(),
        "Configuration loaded"
    );

    match cli.command {
        Commands::Train => train::run(config, cli.format)?,
        Commands::Estimate(args) => estimate::run(config, args, cli.format)?,
        Commands::Market(market_cmd) => match market_cmd {
            MarketCommands::Brands { top } => market::brands(config, top, cli.format)?,
            MarketCommands::Correlation => market::correlation(config, cli.format)?,
        },
        Commands::Analyze(analyze_cmd) => match analyze_cmd {
            AnalyzeCommands::Summary { brand, model, year } => {
                analyze::summary(config, &brand, &model, year, cli.format)?
            }
            AnalyzeCommands::Trend {
                brand,
                model,
                points,
            } => analyze::trend(config, &brand, &model, points, cli.format)?,
        },
    }

    Ok(())
}
