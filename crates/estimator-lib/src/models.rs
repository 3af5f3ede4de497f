//! Core data models for the price estimator

use crate::error::{EstimatorError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fuel type, recoded to the small integers the model trains on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FuelType {
    Essence,
    Diesel,
}

impl FuelType {
    pub fn code(self) -> u8 {
        match self {
            FuelType::Essence => 1,
            FuelType::Diesel => 2,
        }
    }
}

impl FromStr for FuelType {
    type Err = EstimatorError;

    /// Accepts the snapshot vocabulary and the already-recoded integer codes
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "essence" | "1" => Ok(FuelType::Essence),
            "diesel" | "2" => Ok(FuelType::Diesel),
            _ => Err(EstimatorError::UnknownFuelType(s.to_string())),
        }
    }
}

impl fmt::Display for FuelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FuelType::Essence => write!(f, "Essence"),
            FuelType::Diesel => write!(f, "Diesel"),
        }
    }
}

/// Gearbox type (binary category)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gearbox {
    Manual,
    Automatic,
}

impl Gearbox {
    pub fn code(self) -> u8 {
        match self {
            Gearbox::Manual => 0,
            Gearbox::Automatic => 1,
        }
    }
}

impl FromStr for Gearbox {
    type Err = EstimatorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "0" | "manual" | "manuelle" => Ok(Gearbox::Manual),
            "1" | "automatic" | "automatique" => Ok(Gearbox::Automatic),
            _ => Err(EstimatorError::InvalidGearbox(s.to_string())),
        }
    }
}

/// One row of the listings snapshot; any field may be missing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawListing {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub horsepower: Option<f64>,
    pub f_horsepower: Option<f64>,
    pub mileage: Option<f64>,
    pub nb_doors: Option<u32>,
    pub nb_seats: Option<u32>,
    pub gearbox: Option<Gearbox>,
    pub fuel_type: Option<FuelType>,
    pub price_cents: Option<i64>,
}

impl RawListing {
    /// Returns the complete listing, or None when any field is missing
    pub fn complete(&self) -> Option<Listing> {
        Some(Listing {
            attributes: CarAttributes {
                brand: self.brand.clone()?,
                model: self.model.clone()?,
                year: self.year?,
                horsepower: self.horsepower?,
                f_horsepower: self.f_horsepower?,
                mileage: self.mileage?,
                nb_doors: self.nb_doors?,
                nb_seats: self.nb_seats?,
                gearbox: self.gearbox?,
                fuel_type: self.fuel_type?,
            },
            price_cents: self.price_cents?,
        })
    }
}

/// Attributes of a single car, as used for encoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarAttributes {
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub horsepower: f64,
    pub f_horsepower: f64,
    pub mileage: f64,
    pub nb_doors: u32,
    pub nb_seats: u32,
    pub gearbox: Gearbox,
    pub fuel_type: FuelType,
}

impl CarAttributes {
    /// Numeric feature values in the base column order
    pub fn numeric_values(&self) -> [f64; 8] {
        [
            self.year as f64,
            self.horsepower,
            self.f_horsepower,
            self.mileage,
            self.nb_doors as f64,
            self.nb_seats as f64,
            self.gearbox.code() as f64,
            self.fuel_type.code() as f64,
        ]
    }
}

/// A complete listing with its observed price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub attributes: CarAttributes,
    pub price_cents: i64,
}

/// Raw single-row estimation input as supplied by a caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateRequest {
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub horsepower: f64,
    pub f_horsepower: f64,
    pub mileage: f64,
    pub nb_doors: u32,
    pub nb_seats: u32,
    pub gearbox: String,
    pub fuel_type: String,
}

impl EstimateRequest {
    /// Recode gearbox and fuel type and range-check the numeric fields.
    ///
    /// Trees route NaN and out-of-domain values down arbitrary branches, so
    /// those are rejected here rather than priced.
    pub fn validate(&self) -> Result<CarAttributes> {
        if self.year < 0 {
            return Err(invalid_attribute("year", self.year));
        }
        for (field, value) in [
            ("horsepower", self.horsepower),
            ("f_horsepower", self.f_horsepower),
            ("mileage", self.mileage),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid_attribute(field, value));
            }
        }

        Ok(CarAttributes {
            brand: self.brand.clone(),
            model: self.model.clone(),
            year: self.year,
            horsepower: self.horsepower,
            f_horsepower: self.f_horsepower,
            mileage: self.mileage,
            nb_doors: self.nb_doors,
            nb_seats: self.nb_seats,
            gearbox: self.gearbox.parse()?,
            fuel_type: self.fuel_type.parse()?,
        })
    }
}

fn invalid_attribute(field: &str, value: impl fmt::Display) -> EstimatorError {
    EstimatorError::InvalidAttribute {
        field: field.to_string(),
        value: value.to_string(),
    }
}

/// Point price prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceEstimate {
    /// Predicted price in minor currency units
    pub price_cents: f64,
    /// True when brand or model was unseen and encoded as the reference category
    pub degraded: bool,
    pub model_trained_at: DateTime<Utc>,
}

impl PriceEstimate {
    /// Price in major currency units, for display
    pub fn price_units(&self) -> f64 {
        self.price_cents / 100.0
    }
}
