//! Estimator configuration
//!
//! The structs carry serde defaults so that any subset of keys can be
//! supplied by a config file or the environment.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What to do when a brand or model was not seen during training
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnseenCategoryPolicy {
    /// Fail the estimate with `EstimatorError::UnseenCategory`
    #[default]
    Reject,
    /// Encode as the reference category and flag the estimate as degraded
    Degrade,
}

/// Number of candidate features examined at each split
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaxFeatures {
    #[default]
    All,
    Sqrt,
    Log2,
    Fraction(f64),
    Fixed(usize),
}

impl MaxFeatures {
    pub fn resolve(self, n_features: usize) -> usize {
        let n = match self {
            MaxFeatures::All => n_features,
            MaxFeatures::Sqrt => (n_features as f64).sqrt().ceil() as usize,
            MaxFeatures::Log2 => (n_features as f64).log2().ceil() as usize,
            MaxFeatures::Fraction(f) => (n_features as f64 * f).ceil() as usize,
            MaxFeatures::Fixed(n) => n,
        };
        n.clamp(1, n_features.max(1))
    }
}

/// Random forest hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,

    #[serde(default)]
    pub max_depth: Option<usize>,

    #[serde(default = "default_min_samples_split")]
    pub min_samples_split: usize,

    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,

    #[serde(default)]
    pub max_features: MaxFeatures,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: default_n_estimators(),
            max_depth: None,
            min_samples_split: default_min_samples_split(),
            min_samples_leaf: default_min_samples_leaf(),
            max_features: MaxFeatures::All,
        }
    }
}

/// Estimator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Listings snapshot (CSV with header row)
    #[serde(default = "default_dataset_path")]
    pub dataset_path: PathBuf,

    /// Persisted model artifact
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Share of complete rows held out for scoring
    #[serde(default = "default_test_fraction")]
    pub test_fraction: f64,

    /// Fixed seed for the split and the bootstrap; random when absent
    #[serde(default)]
    pub seed: Option<u64>,

    /// Gzip level of the model artifact (0-9)
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,

    #[serde(default)]
    pub unseen_category: UnseenCategoryPolicy,

    #[serde(default)]
    pub forest: ForestConfig,
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("data/listings.csv")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("models/price_model.bin.gz")
}

fn default_test_fraction() -> f64 {
    0.2
}

fn default_compression_level() -> u32 {
    3
}

fn default_n_estimators() -> usize {
    100
}

fn default_min_samples_split() -> usize {
    2
}

fn default_min_samples_leaf() -> usize {
    1
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            dataset_path: default_dataset_path(),
            model_path: default_model_path(),
            test_fraction: default_test_fraction(),
            seed: None,
            compression_level: default_compression_level(),
            unseen_category: UnseenCategoryPolicy::default(),
            forest: ForestConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EstimatorConfig::default();
        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.compression_level, 3);
        assert_eq!(config.forest.n_estimators, 100);
        assert_eq!(config.unseen_category, UnseenCategoryPolicy::Reject);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EstimatorConfig = serde_json::from_str(
            r#"{"seed": 7, "unseen_category": "degrade", "forest": {"n_estimators": 10}}"#,
        )
        .unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.unseen_category, UnseenCategoryPolicy::Degrade);
        assert_eq!(config.forest.n_estimators, 10);
        assert_eq!(config.forest.min_samples_split, 2);
        assert_eq!(config.model_path, PathBuf::from("models/price_model.bin.gz"));
    }

    #[test]
    fn test_max_features_resolution() {
        assert_eq!(MaxFeatures::All.resolve(16), 16);
        assert_eq!(MaxFeatures::Sqrt.resolve(16), 4);
        assert_eq!(MaxFeatures::Fixed(40).resolve(16), 16);
        assert_eq!(MaxFeatures::Fraction(0.0).resolve(16), 1);
    }
}
