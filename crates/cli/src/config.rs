//! Configuration management for the CLI
//!
//! Sources are layered, later ones overriding earlier ones:
//! built-in defaults, the user config file, `carprice.toml` (or an explicit
//! `--config` file), `CARPRICE__*` environment variables, then flags.

use anyhow::{Context, Result};
use estimator_lib::EstimatorConfig;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "CARPRICE";
const LOCAL_CONFIG_NAME: &str = "carprice";

/// Load the estimator configuration
pub fn load(
    explicit: Option<&Path>,
    data_override: Option<PathBuf>,
    model_override: Option<PathBuf>,
) -> Result<EstimatorConfig> {
    let mut builder = config::Config::builder();

    if let Some(user) = user_config_path() {
        builder = builder.add_source(config::File::from(user).required(false));
    }
    builder = match explicit {
        Some(path) => builder.add_source(config::File::from(path).required(true)),
        None => builder.add_source(config::File::with_name(LOCAL_CONFIG_NAME).required(false)),
    };
    builder = builder.add_source(
        config::Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true),
    );

    let mut estimator: EstimatorConfig = builder
        .build()
        .context("Failed to read configuration")?
        .try_deserialize()
        .context("Invalid configuration")?;

    if let Some(path) = data_override {
        estimator.dataset_path = path;
    }
    if let Some(path) = model_override {
        estimator.model_path = path;
    }
    Ok(estimator)
}

/// Per-user config file, e.g. `~/.config/carprice/config.toml`
fn user_config_path() -> Option<PathBuf> {
    let home = dirs_next::home_dir()?;
    Some(home.join(".config").join("carprice").join("config.toml"))
}
