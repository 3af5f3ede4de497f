use super::stats::{pearson, round_to, trim_bounds};
use crate::data::ListingTable;
use crate::error::{EstimatorError, Result};
use crate::models::RawListing;
use serde::Serialize;
use std::collections::HashMap;

/// Numeric columns of the correlation matrix, price in currency units
const CORRELATION_COLUMNS: [&str; 7] = [
    "year",
    "horsepower",
    "f_horsepower",
    "mileage",
    "nb_doors",
    "nb_seats",
    "price",
];

/// Number of listings of one brand
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrandCount {
    pub brand: String,
    pub count: usize,
}

/// Listings per brand, most frequent first; ties ordered by name
pub fn brand_distribution(table: &ListingTable) -> Vec<BrandCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for brand in table.rows().iter().filter_map(|r| r.brand.as_deref()) {
        *counts.entry(brand).or_default() += 1;
    }

    let mut distribution: Vec<BrandCount> = counts
        .into_iter()
        .map(|(brand, count)| BrandCount {
            brand: brand.to_string(),
            count,
        })
        .collect();
    distribution.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.brand.cmp(&b.brand)));
    distribution
}

/// Pairwise Pearson correlations of the numeric listing columns
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major coefficients; None where a column had no variance
    pub values: Vec<Vec<Option<f64>>>,
    /// Rows left after dropping missing values and trimming outliers
    pub rows_used: usize,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }

    /// Copy with every coefficient rounded to two decimals
    pub fn rounded(&self) -> Self {
        Self {
            columns: self.columns.clone(),
            values: self
                .values
                .iter()
                .map(|row| row.iter().map(|v| v.map(|v| round_to(v, 2))).collect())
                .collect(),
            rows_used: self.rows_used,
        }
    }
}

fn numeric_row(row: &RawListing) -> Option<[f64; 7]> {
    Some([
        row.year? as f64,
        row.horsepower?,
        row.f_horsepower?,
        row.mileage?,
        row.nb_doors? as f64,
        row.nb_seats? as f64,
        row.price_cents? as f64 / 100.0,
    ])
}

/// Correlation matrix after dropping incomplete rows and trimming each
/// column in turn to its [1%, 99%] quantile band
pub fn correlation_matrix(table: &ListingTable) -> Result<CorrelationMatrix> {
    let mut rows: Vec<[f64; 7]> = table.rows().iter().filter_map(numeric_row).collect();

    for col in 0..CORRELATION_COLUMNS.len() {
        let column: Vec<f64> = rows.iter().map(|r| r[col]).collect();
        if let Some((low, high)) = trim_bounds(&column) {
            rows.retain(|r| r[col] >= low && r[col] <= high);
        }
    }

    if rows.len() < 2 {
        return Err(EstimatorError::InsufficientData(format!(
            "{} complete listing(s) left for correlation, need at least 2",
            rows.len()
        )));
    }

    let columns: Vec<Vec<f64>> = (0..CORRELATION_COLUMNS.len())
        .map(|col| rows.iter().map(|r| r[col]).collect())
        .collect();
    let values = columns
        .iter()
        .map(|a| columns.iter().map(|b| pearson(a, b)).collect())
        .collect();

    Ok(CorrelationMatrix {
        columns: CORRELATION_COLUMNS.iter().map(|c| c.to_string()).collect(),
        values,
        rows_used: rows.len(),
    })
}
