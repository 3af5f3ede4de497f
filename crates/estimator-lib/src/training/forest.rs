//! Random forest regressor
//!
//! Bootstrap-aggregated regression trees. Each tree draws its own
//! ChaCha8 stream from the base seed, so a fixed seed reproduces the
//! forest exactly regardless of how rayon schedules the work.

use super::tree::{RegressionTree, TreeParams};
use crate::config::ForestConfig;
use crate::error::{EstimatorError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestRegressor {
    params: ForestConfig,
    trees: Vec<RegressionTree>,
    n_features: usize,
    feature_importances: Vec<f64>,
}

impl RandomForestRegressor {
    pub fn new(params: ForestConfig) -> Self {
        Self {
            params,
            trees: Vec::new(),
            n_features: 0,
            feature_importances: Vec::new(),
        }
    }

    pub fn params(&self) -> &ForestConfig {
        &self.params
    }

    /// Fit the forest to `x` / `y`
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>, seed: u64) -> Result<&mut Self> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if n_samples != y.len() {
            return Err(EstimatorError::ShapeMismatch {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(EstimatorError::EmptyCorpus);
        }

        let tree_params = TreeParams {
            max_depth: self.params.max_depth,
            min_samples_split: self.params.min_samples_split.max(2),
            min_samples_leaf: self.params.min_samples_leaf.max(1),
            max_features: self.params.max_features.resolve(n_features),
        };
        let targets: Vec<f64> = y.to_vec();
        let n_estimators = self.params.n_estimators.max(1);

        let trees: Vec<RegressionTree> = (0..n_estimators)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(tree_idx as u64));
                let sample_indices: Vec<usize> = (0..n_samples)
                    .map(|_| rng.gen_range(0..n_samples))
                    .collect();
                RegressionTree::fit(x, &targets, &sample_indices, &tree_params, &mut rng)
            })
            .collect();

        self.trees = trees;
        self.n_features = n_features;
        self.compute_feature_importances();
        Ok(self)
    }

    fn compute_feature_importances(&mut self) {
        let mut total = vec![0.0; self.n_features];
        for tree in &self.trees {
            let tree_total: f64 = tree.importances().iter().sum();
            if tree_total <= 0.0 {
                continue;
            }
            for (acc, imp) in total.iter_mut().zip(tree.importances()) {
                *acc += imp / tree_total;
            }
        }

        let sum: f64 = total.iter().sum();
        if sum > 0.0 {
            for imp in &mut total {
                *imp /= sum;
            }
        }
        self.feature_importances = total;
    }

    /// Mean of the tree predictions for one encoded row
    pub fn predict_row(&self, row: ArrayView1<'_, f64>) -> Result<f64> {
        if self.trees.is_empty() {
            return Err(EstimatorError::ModelNotFitted);
        }
        if row.len() != self.n_features {
            return Err(EstimatorError::ShapeMismatch {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", row.len()),
            });
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict_row(row)).sum();
        Ok(sum / self.trees.len() as f64)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let predictions = x
            .rows()
            .into_iter()
            .map(|row| self.predict_row(row))
            .collect::<Result<Vec<f64>>>()?;
        Ok(Array1::from_vec(predictions))
    }

    /// Normalised mean squared-error decrease per feature
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }
}
