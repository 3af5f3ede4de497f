//! Per-model analysis commands

use anyhow::{Context, Result};
use colored::Colorize;
use estimator_lib::analysis::{model_summary, price_trend};
use estimator_lib::EstimatorConfig;
use tabled::Tabled;

use super::load_corpus;
use crate::output::{format_optional_price, format_price, print_heading, print_json, print_table, print_warning, OutputFormat};

#[derive(Tabled)]
struct CurveRow {
    #[tabled(rename = "Mileage (km)")]
    mileage: String,
    #[tabled(rename = "Trend price")]
    price: String,
}

/// Show price and mileage statistics for a brand/model query
pub fn summary(
    config: EstimatorConfig,
    brand: &str,
    model: &str,
    year: Option<i32>,
    format: OutputFormat,
) -> Result<()> {
    let corpus = load_corpus(&config)?;
    let summary = model_summary(&corpus, brand, model, year);

    match format {
        OutputFormat::Json => print_json(&summary)?,
        OutputFormat::Table => {
            print_heading(&format!("{} {}", brand, model));
            if let Some(year) = year {
                println!("Year:                   {}", year);
            }
            if summary.count == 0 {
                print_warning("No matching listings");
                return Ok(());
            }
            println!("Mean price:             {}", format_optional_price(summary.mean_price).green());
            println!("Median price:           {}", format_optional_price(summary.median_price).green());
            println!(
                "Mean mileage:           {}",
                summary
                    .mean_mileage
                    .map(|m| format!("{} km", m))
                    .unwrap_or_else(|| "-".to_string())
            );
            println!("{}", format!("Listings: {}", summary.count).dimmed());
        }
    }
    Ok(())
}

/// Fit and show the price/mileage trend of one model
pub fn trend(
    config: EstimatorConfig,
    brand: &str,
    model: &str,
    points: usize,
    format: OutputFormat,
) -> Result<()> {
    let corpus = load_corpus(&config)?;
    let trend = price_trend(&corpus, brand, model, points)
        .with_context(|| format!("Cannot fit a price trend for {} {}", brand, model))?;

    match format {
        OutputFormat::Json => print_json(&trend)?,
        OutputFormat::Table => {
            print_heading(&format!("Price vs mileage: {} {}", brand, model));
            let [a, b, c] = trend.coefficients;
            println!("Trend:                  price = {:.3e}·km² + {:.4}·km + {:.2}", a, b, c);
            println!("Listings fitted:        {}", trend.samples.len());
            println!();

            let rows: Vec<CurveRow> = trend
                .curve
                .iter()
                .map(|p| CurveRow {
                    mileage: format!("{:.0}", p.mileage),
                    price: format_price(p.price),
                })
                .collect();
            print_table(&rows);
        }
    }
    Ok(())
}
