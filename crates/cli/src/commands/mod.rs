//! Subcommand implementations

pub mod analyze;
pub mod estimate;
pub mod market;
pub mod train;

use anyhow::{Context, Result};
use estimator_lib::data::ListingTable;
use estimator_lib::EstimatorConfig;

/// Load the listings snapshot named by the configuration
pub fn load_corpus(config: &EstimatorConfig) -> Result<ListingTable> {
    ListingTable::load(&config.dataset_path).with_context(|| {
        format!(
            "Failed to load listings from {}",
            config.dataset_path.display()
        )
    })
}
