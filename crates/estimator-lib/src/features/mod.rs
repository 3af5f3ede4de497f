//! Feature encoding for the price model
//!
//! Listings are expressed as a fixed block of numeric columns followed
//! by one-hot indicator columns for brand and model. The indicator set
//! is fixed at training time by a [`FeatureSchema`]; single rows are
//! re-expressed against it with [`reconcile`].

mod encoder;
mod schema;

pub use encoder::OneHotEncoder;
pub use schema::{
    reconcile, CategoryVocabulary, FeatureColumn, FeatureKind, FeatureSchema, Reconciled,
};

use crate::error::{EstimatorError, Result};
use crate::models::CarAttributes;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Base numeric columns, in encoding order
pub const NUMERIC_COLUMNS: [&str; 8] = [
    "year",
    "horsepower",
    "f_horsepower",
    "mileage",
    "nb_doors",
    "nb_seats",
    "gearbox",
    "fuel_type",
];

/// Categorical columns expanded into indicator columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoricalColumn {
    Brand,
    Model,
}

impl CategoricalColumn {
    pub const ALL: [CategoricalColumn; 2] = [CategoricalColumn::Brand, CategoricalColumn::Model];

    pub fn name(self) -> &'static str {
        match self {
            CategoricalColumn::Brand => "brand",
            CategoricalColumn::Model => "model",
        }
    }

    pub fn value_of(self, attributes: &CarAttributes) -> &str {
        match self {
            CategoricalColumn::Brand => &attributes.brand,
            CategoricalColumn::Model => &attributes.model,
        }
    }

    /// Name of the indicator column for `value`
    pub fn indicator_name(self, value: &str) -> String {
        format!("{}_{}", self.name(), value)
    }
}

impl fmt::Display for CategoricalColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named columns over a dense row-major matrix
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFrame {
    columns: Vec<String>,
    values: Array2<f64>,
}

impl EncodedFrame {
    pub fn new(columns: Vec<String>, values: Array2<f64>) -> Result<Self> {
        if columns.len() != values.ncols() {
            return Err(EstimatorError::ShapeMismatch {
                expected: format!("{} columns", columns.len()),
                actual: format!("{} columns", values.ncols()),
            });
        }
        Ok(Self { columns, values })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_cols(&self) -> usize {
        self.values.ncols()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn row(&self, index: usize) -> ArrayView1<'_, f64> {
        self.values.row(index)
    }

    pub fn into_values(self) -> Array2<f64> {
        self.values
    }
}
