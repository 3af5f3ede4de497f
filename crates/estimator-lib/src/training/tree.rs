//! Regression tree (CART, squared-error criterion)

use ndarray::{Array2, ArrayView1};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Node of a fitted tree; children are indices into the node arena
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        value: f64,
        n_samples: usize,
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: usize,
        right: usize,
        n_samples: usize,
        impurity: f64,
    },
}

/// Growth limits for a single tree
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Candidate features examined per split
    pub max_features: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
    n_features: usize,
    /// Unnormalised squared-error decrease per feature
    importances: Vec<f64>,
}

struct BestSplit {
    feature_idx: usize,
    threshold: f64,
    child_sse: f64,
}

impl RegressionTree {
    /// Grow a tree on the rows of `x` selected by `indices` (repeats allowed)
    pub fn fit<R: Rng>(
        x: &Array2<f64>,
        y: &[f64],
        indices: &[usize],
        params: &TreeParams,
        rng: &mut R,
    ) -> Self {
        let n_features = x.ncols();
        let mut tree = Self {
            nodes: Vec::new(),
            n_features,
            importances: vec![0.0; n_features],
        };
        if indices.is_empty() {
            tree.nodes.push(TreeNode::Leaf {
                value: 0.0,
                n_samples: 0,
            });
            return tree;
        }
        tree.build(x, y, indices.to_vec(), 0, params, rng);
        tree
    }

    fn build<R: Rng>(
        &mut self,
        x: &Array2<f64>,
        y: &[f64],
        indices: Vec<usize>,
        depth: usize,
        params: &TreeParams,
        rng: &mut R,
    ) -> usize {
        let n_samples = indices.len();
        let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / n_samples as f64;
        let sse: f64 = indices.iter().map(|&i| (y[i] - mean).powi(2)).sum();

        let node_idx = self.nodes.len();
        self.nodes.push(TreeNode::Leaf {
            value: mean,
            n_samples,
        });

        let should_stop = n_samples < params.min_samples_split
            || n_samples < 2 * params.min_samples_leaf
            || params.max_depth.map_or(false, |d| depth >= d)
            || sse <= f64::EPSILON * mean.abs().max(1.0);
        if should_stop {
            return node_idx;
        }

        let best = match self.find_best_split(x, y, &indices, mean, sse, params, rng) {
            Some(best) => best,
            None => return node_idx,
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, best.feature_idx]] <= best.threshold);

        self.importances[best.feature_idx] += sse - best.child_sse;

        let left = self.build(x, y, left_indices, depth + 1, params, rng);
        let right = self.build(x, y, right_indices, depth + 1, params, rng);

        self.nodes[node_idx] = TreeNode::Split {
            feature_idx: best.feature_idx,
            threshold: best.threshold,
            left,
            right,
            n_samples,
            impurity: sse / n_samples as f64,
        };
        node_idx
    }

    /// Sort-and-sweep search for the split with the lowest child SSE
    #[allow(clippy::too_many_arguments)]
    fn find_best_split<R: Rng>(
        &self,
        x: &Array2<f64>,
        y: &[f64],
        indices: &[usize],
        mean: f64,
        parent_sse: f64,
        params: &TreeParams,
        rng: &mut R,
    ) -> Option<BestSplit> {
        let n_features = x.ncols();
        let candidates: Vec<usize> = if params.max_features >= n_features {
            (0..n_features).collect()
        } else {
            rand::seq::index::sample(rng, n_features, params.max_features).into_vec()
        };

        let n = indices.len();
        // Targets centred on the node mean keep the running sums small
        let total_sum: f64 = indices.iter().map(|&i| y[i] - mean).sum();
        let total_sq: f64 = indices.iter().map(|&i| (y[i] - mean).powi(2)).sum();

        let mut best: Option<BestSplit> = None;
        let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(n);

        for feature_idx in candidates {
            pairs.clear();
            pairs.extend(indices.iter().map(|&i| (x[[i, feature_idx]], y[i] - mean)));
            pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;
            for pos in 0..n - 1 {
                let (xv, yv) = pairs[pos];
                left_sum += yv;
                left_sq += yv * yv;

                let next_x = pairs[pos + 1].0;
                if next_x <= xv {
                    continue;
                }
                let left_count = pos + 1;
                let right_count = n - left_count;
                if left_count < params.min_samples_leaf || right_count < params.min_samples_leaf {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let child_sse = (left_sq - left_sum * left_sum / left_count as f64)
                    + (right_sq - right_sum * right_sum / right_count as f64);

                if best.as_ref().map_or(true, |b| child_sse < b.child_sse) {
                    best = Some(BestSplit {
                        feature_idx,
                        threshold: (xv + next_x) / 2.0,
                        child_sse,
                    });
                }
            }
        }

        best.filter(|b| parent_sse - b.child_sse > f64::EPSILON * parent_sse)
    }

    pub fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { value, .. } => return *value,
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if row[*feature_idx] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn importances(&self) -> &[f64] {
        &self.importances
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, TreeNode::Leaf { .. }))
            .count()
    }

    pub fn depth(&self) -> usize {
        fn node_depth(nodes: &[TreeNode], idx: usize) -> usize {
            match &nodes[idx] {
                TreeNode::Leaf { .. } => 1,
                TreeNode::Split { left, right, .. } => {
                    1 + node_depth(nodes, *left).max(node_depth(nodes, *right))
                }
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            node_depth(&self.nodes, 0)
        }
    }
}
