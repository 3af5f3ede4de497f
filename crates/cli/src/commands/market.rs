//! Market-wide statistics commands

use anyhow::{Context, Result};
use estimator_lib::analysis::{brand_distribution, correlation_matrix};
use estimator_lib::EstimatorConfig;
use tabled::Tabled;

use super::load_corpus;
use crate::output::{color_correlation, print_grid, print_heading, print_json, print_table, OutputFormat};

#[derive(Tabled)]
struct BrandRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Brand")]
    brand: String,
    #[tabled(rename = "Listings")]
    count: usize,
    #[tabled(rename = "Share")]
    share: String,
}

/// Show the number of listings per brand
pub fn brands(config: EstimatorConfig, top: Option<usize>, format: OutputFormat) -> Result<()> {
    let corpus = load_corpus(&config)?;
    let mut distribution = brand_distribution(&corpus);
    let total: usize = distribution.iter().map(|b| b.count).sum();
    if let Some(n) = top {
        distribution.truncate(n);
    }

    match format {
        OutputFormat::Json => print_json(&distribution)?,
        OutputFormat::Table => {
            print_heading("Brand Distribution");
            let rows: Vec<BrandRow> = distribution
                .into_iter()
                .enumerate()
                .map(|(i, b)| BrandRow {
                    rank: i + 1,
                    share: format!("{:.1}%", b.count as f64 / total.max(1) as f64 * 100.0),
                    brand: b.brand,
                    count: b.count,
                })
                .collect();
            print_table(&rows);
        }
    }
    Ok(())
}

/// Show the correlation matrix of the numeric columns
pub fn correlation(config: EstimatorConfig, format: OutputFormat) -> Result<()> {
    let corpus = load_corpus(&config)?;
    let matrix = correlation_matrix(&corpus)
        .context("Cannot compute correlations")?
        .rounded();

    match format {
        OutputFormat::Json => print_json(&matrix)?,
        OutputFormat::Table => {
            print_heading("Correlation Matrix");
            let mut header = vec![String::new()];
            header.extend(matrix.columns.iter().cloned());
            let rows: Vec<Vec<String>> = matrix
                .columns
                .iter()
                .zip(&matrix.values)
                .map(|(name, values)| {
                    std::iter::once(name.clone())
                        .chain(values.iter().map(|v| color_correlation(*v)))
                        .collect::<Vec<String>>()
                })
                .collect();
            print_grid(header, rows);
            println!("Listings used after trimming: {}", matrix.rows_used);
        }
    }
    Ok(())
}
