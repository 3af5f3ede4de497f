//! Single-car price estimation command

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use estimator_lib::{EstimateRequest, EstimatorConfig, EstimatorService, InitOutcome};
use serde::Serialize;

use super::load_corpus;
use crate::output::{format_price, print_info, print_json, print_warning, OutputFormat};

/// Attributes of the car to price
#[derive(Debug, Args)]
pub struct EstimateArgs {
    /// Brand, e.g. Renault
    #[arg(long)]
    pub brand: String,

    /// Model, e.g. Clio
    #[arg(long)]
    pub model: String,

    /// Model year
    #[arg(long)]
    pub year: i32,

    /// Actual horsepower
    #[arg(long)]
    pub horsepower: f64,

    /// Fiscal horsepower
    #[arg(long)]
    pub f_horsepower: f64,

    /// Mileage in kilometres
    #[arg(long)]
    pub mileage: f64,

    /// Number of doors
    #[arg(long, default_value_t = 5)]
    pub doors: u32,

    /// Number of seats
    #[arg(long, default_value_t = 5)]
    pub seats: u32,

    /// Gearbox: 0/manual or 1/automatic
    #[arg(long, default_value = "0")]
    pub gearbox: String,

    /// Fuel type: Essence or Diesel
    #[arg(long)]
    pub fuel: String,
}

impl From<EstimateArgs> for EstimateRequest {
    fn from(args: EstimateArgs) -> Self {
        EstimateRequest {
            brand: args.brand,
            model: args.model,
            year: args.year,
            horsepower: args.horsepower,
            f_horsepower: args.f_horsepower,
            mileage: args.mileage,
            nb_doors: args.doors,
            nb_seats: args.seats,
            gearbox: args.gearbox,
            fuel_type: args.fuel,
        }
    }
}

#[derive(Serialize)]
struct EstimateOutput {
    brand: String,
    model: String,
    price: f64,
    price_cents: f64,
    degraded: bool,
    model_trained_at: DateTime<Utc>,
    trained_now: bool,
}

/// Load (or train) the model and price one car
pub fn run(config: EstimatorConfig, args: EstimateArgs, format: OutputFormat) -> Result<()> {
    let corpus = load_corpus(&config)?;
    let mut service = EstimatorService::new(config, corpus);
    let outcome = service
        .initialize()
        .context("Failed to initialize the price model")?;

    let request = EstimateRequest::from(args);
    let estimate = service.estimate(&request).context("Estimation failed")?;

    match format {
        OutputFormat::Json => print_json(&EstimateOutput {
            brand: request.brand.clone(),
            model: request.model.clone(),
            price: estimate.price_units(),
            price_cents: estimate.price_cents,
            degraded: estimate.degraded,
            model_trained_at: estimate.model_trained_at,
            trained_now: matches!(outcome, InitOutcome::Trained(_)),
        })?,
        OutputFormat::Table => {
            if let InitOutcome::Trained(report) = &outcome {
                print_info(&format!(
                    "No saved model found, trained one on {} listings",
                    report.rows_train
                ));
            }
            if estimate.degraded {
                print_warning(&format!(
                    "{} {} was not seen during training; the estimate ignores brand and model",
                    request.brand, request.model
                ));
            }
            println!(
                "Estimated price for {} {}: {}",
                request.brand.cyan(),
                request.model.cyan(),
                format_price(estimate.price_units()).green().bold()
            );
            println!(
                "{}",
                format!(
                    "Model trained {}",
                    estimate.model_trained_at.format("%Y-%m-%d %H:%M UTC")
                )
                .dimmed()
            );
        }
    }
    Ok(())
}
