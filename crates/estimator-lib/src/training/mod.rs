//! Model training
//!
//! Random-forest regression over the encoded corpus, a shuffled
//! train/test split and held-out scoring.

mod forest;
mod metrics;
mod split;
mod trainer;
mod tree;

pub use forest::RandomForestRegressor;
pub use metrics::{mean_absolute_error, r2_score};
pub use split::train_test_split;
pub use trainer::{ModelTrainer, TrainingReport};
pub use tree::{RegressionTree, TreeNode, TreeParams};
