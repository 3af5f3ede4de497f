use super::stats::{mean, median, round_to};
use crate::data::ListingTable;
use crate::models::RawListing;
use serde::Serialize;

/// Price and mileage statistics for listings matching a brand/model query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    pub brand: String,
    pub model: String,
    pub year: Option<i32>,
    /// Matching listings, including those with missing price or mileage
    pub count: usize,
    /// Mean price in currency units, two decimals
    pub mean_price: Option<f64>,
    /// Median price in currency units
    pub median_price: Option<f64>,
    /// Mean mileage in kilometres, rounded to the unit
    pub mean_mileage: Option<i64>,
}

fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack
        .map(|h| h.to_lowercase().contains(needle))
        .unwrap_or(false)
}

/// Summarise listings whose brand and model contain the given fragments
/// (case-insensitive), optionally restricted to one model year
pub fn model_summary(
    table: &ListingTable,
    brand: &str,
    model: &str,
    year: Option<i32>,
) -> ModelSummary {
    let brand_needle = brand.to_lowercase();
    let model_needle = model.to_lowercase();

    let matches: Vec<&RawListing> = table
        .rows()
        .iter()
        .filter(|r| contains_ignore_case(r.brand.as_deref(), &brand_needle))
        .filter(|r| contains_ignore_case(r.model.as_deref(), &model_needle))
        .filter(|r| year.map_or(true, |y| r.year == Some(y)))
        .collect();

    let prices: Vec<f64> = matches
        .iter()
        .filter_map(|r| r.price_cents)
        .map(|p| p as f64 / 100.0)
        .collect();
    let mileages: Vec<f64> = matches.iter().filter_map(|r| r.mileage).collect();

    ModelSummary {
        brand: brand.to_string(),
        model: model.to_string(),
        year,
        count: matches.len(),
        mean_price: mean(&prices).map(|p| round_to(p, 2)),
        median_price: median(&prices),
        mean_mileage: mean(&mileages).map(|m| m.round() as i64),
    }
}
