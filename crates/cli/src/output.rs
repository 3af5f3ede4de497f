//! Output formatting utilities

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a table from a list of items
pub fn print_table<T: Tabled>(items: &[T]) {
    if items.is_empty() {
        println!("{}", "No items found".yellow());
        return;
    }
    let table = Table::new(items).with(Style::rounded()).to_string();
    println!("{}", table);
}

/// Print a table whose header is only known at runtime
pub fn print_grid(header: Vec<String>, rows: Vec<Vec<String>>) {
    let mut builder = Builder::default();
    builder.push_record(header);
    for row in rows {
        builder.push_record(row);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    println!("{}", table);
}

/// Print a section heading
pub fn print_heading(title: &str) {
    println!("{}", title.bold());
    println!("{}", "=".repeat(50));
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a price in major currency units
pub fn format_price(amount: f64) -> String {
    format!("€{:.2}", amount)
}

pub fn format_optional_price(amount: Option<f64>) -> String {
    amount.map(format_price).unwrap_or_else(|| "-".to_string())
}

/// Format a correlation coefficient, colored by strength
pub fn color_correlation(value: Option<f64>) -> String {
    match value {
        None => "-".dimmed().to_string(),
        Some(v) => {
            let formatted = format!("{:.2}", v);
            if v.abs() >= 0.7 {
                formatted.green().to_string()
            } else if v.abs() >= 0.3 {
                formatted.yellow().to_string()
            } else {
                formatted
            }
        }
    }
}

/// Format a held-out R², colored by quality
pub fn color_r2(r2: Option<f64>) -> String {
    match r2 {
        None => "n/a (undefined on held-out rows)".dimmed().to_string(),
        Some(v) => {
            let formatted = format!("{:.3}", v);
            if v >= 0.8 {
                formatted.green().to_string()
            } else if v >= 0.5 {
                formatted.yellow().to_string()
            } else {
                formatted.red().to_string()
            }
        }
    }
}
