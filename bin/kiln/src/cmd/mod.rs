//! CLI command implementations.

pub mod build;
pub mod check;
pub mod new;
pub mod routes;

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use kiln_core::Config;

/// Load the site configuration, with `KILN__` environment overrides.
pub(crate) fn load_config(config_path: &Path) -> Result<Config> {
    let config = Config::load_with_env(config_path)
        .wrap_err_with(|| format!("Failed to load configuration from {}", config_path.display()))?;
    tracing::debug!(?config, "Loaded configuration");
    Ok(config)
}
