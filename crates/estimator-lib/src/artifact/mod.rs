//! Trained model artifact and its on-disk store

mod store;

pub use store::{compute_checksum, ModelStore, ARTIFACT_MAGIC, FORMAT_VERSION};

use crate::config::ForestConfig;
use crate::error::{EstimatorError, Result};
use crate::features::{EncodedFrame, FeatureSchema};
use crate::training::RandomForestRegressor;
use chrono::{DateTime, Utc};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Training provenance stored with the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub trained_at: DateTime<Utc>,
    pub rows_train: usize,
    pub rows_test: usize,
    /// R² on the held-out partition, when defined
    pub held_out_r2: Option<f64>,
    pub seed: u64,
    pub forest: ForestConfig,
}

/// A fitted regressor plus the feature schema it expects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub metadata: ModelMetadata,
    pub schema: FeatureSchema,
    pub forest: RandomForestRegressor,
}

impl ModelArtifact {
    /// Predict for a frame already aligned with the schema.
    ///
    /// Trees address features by position, so the frame's column names
    /// must equal the schema's, in order.
    pub fn predict(&self, frame: &EncodedFrame) -> Result<Array1<f64>> {
        let aligned = frame.columns().len() == self.schema.len()
            && frame
                .columns()
                .iter()
                .zip(self.schema.names())
                .all(|(a, b)| a == b);
        if !aligned {
            return Err(EstimatorError::ShapeMismatch {
                expected: format!("{} schema columns in training order", self.schema.len()),
                actual: format!("{} columns", frame.n_cols()),
            });
        }
        self.forest.predict(frame.values())
    }

    /// Feature names paired with importances, most important first
    pub fn ranked_importances(&self) -> Vec<(String, f64)> {
        let mut ranked: Vec<(String, f64)> = self
            .schema
            .names()
            .map(str::to_string)
            .zip(self.forest.feature_importances().iter().copied())
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }
}
