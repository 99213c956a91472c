//! Configuration loading utilities for CLI commands

use anyhow::{Context, Result};
use gravpoly_core::config::{CliConfigOverrides, LayeredConfig};
use std::path::{Path, PathBuf};

/// File picked up from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "gravpoly.toml";

/// Load layered configuration: defaults, then the config file, then the
/// environment
pub fn load_config(explicit: Option<&Path>) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();

    match config_path(explicit)? {
        Some(path) => {
            tracing::debug!("Loading configuration from {}", path.display());
            config = config
                .load_from_file(&path)
                .with_context(|| format!("Failed to load configuration file {}", path.display()))?;
        }
        None => tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE),
    }

    Ok(config.load_from_env())
}

/// Load layered configuration with CLI overrides
pub fn load_config_with_overrides(
    explicit: Option<&Path>,
    overrides: CliConfigOverrides,
) -> Result<LayeredConfig> {
    let mut config = load_config(explicit)?;
    config.update_from_cli(overrides);
    Ok(config)
}

/// An explicit path must exist; the default file is optional
fn config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        return Ok(Some(path.to_path_buf()));
    }
    let default = std::env::current_dir()
        .context("Failed to read the working directory")?
        .join(DEFAULT_CONFIG_FILE);
    Ok(default.is_file().then_some(default))
}
