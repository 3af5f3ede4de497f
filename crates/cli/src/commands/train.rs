//! Model training command

use anyhow::{Context, Result};
use estimator_lib::training::TrainingReport;
use estimator_lib::{EstimatorConfig, EstimatorService};
use serde::Serialize;
use tabled::Tabled;

use super::load_corpus;
use crate::output::{color_r2, print_heading, print_json, print_success, print_table, OutputFormat};

/// Number of importances shown in table output
const SHOWN_FEATURES: usize = 5;

#[derive(Tabled)]
struct FeatureRow {
    #[tabled(rename = "Feature")]
    name: String,
    #[tabled(rename = "Importance")]
    importance: String,
}

#[derive(Serialize)]
struct TrainOutput<'a> {
    model_path: String,
    #[serde(flatten)]
    report: &'a TrainingReport,
}

/// Retrain the model from the snapshot and overwrite the artifact
pub fn run(config: EstimatorConfig, format: OutputFormat) -> Result<()> {
    let corpus = load_corpus(&config)?;
    let model_path = config.model_path.display().to_string();

    let mut service = EstimatorService::new(config, corpus);
    let report = service.retrain().context("Training failed")?;

    match format {
        OutputFormat::Json => print_json(&TrainOutput {
            model_path,
            report: &report,
        })?,
        OutputFormat::Table => print_report(&report, &model_path),
    }
    Ok(())
}

fn print_report(report: &TrainingReport, model_path: &str) {
    print_heading("Training Summary");
    println!("Listings loaded:        {}", report.rows_total);
    println!("Complete listings:      {}", report.rows_complete);
    println!(
        "Train / test rows:      {} / {}",
        report.rows_train, report.rows_test
    );
    println!("Features:               {}", report.n_features);
    println!("Held-out R²:            {}", color_r2(report.held_out_r2));
    if let Some(mae) = report.held_out_mae_cents {
        println!("Held-out MAE:           €{:.2}", mae / 100.0);
    }
    println!("Seed:                   {}", report.seed);
    println!("Duration:               {} ms", report.duration_ms);
    println!();

    let rows: Vec<FeatureRow> = report
        .top_features
        .iter()
        .take(SHOWN_FEATURES)
        .map(|(name, importance)| FeatureRow {
            name: name.clone(),
            importance: format!("{:.3}", importance),
        })
        .collect();
    print_table(&rows);
    println!();

    print_success(&format!("Model written to {}", model_path));
}
