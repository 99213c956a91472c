//! Command implementations

mod config;
mod forward;
mod inspect;
mod invert;
mod resample;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::{Context, Result};
use gravpoly_core::formats::ProfileReader;
use gravpoly_core::models::Profile;
use std::path::Path;

/// Execute a CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Forward(args) => forward::execute(args, config_path, &output),
        Commands::Resample(args) => resample::execute(args, config_path, &output),
        Commands::Invert(args) => invert::execute(args, config_path, &output),
        Commands::Inspect(args) => inspect::execute(args, &output),
        Commands::Config(args) => config::execute(args, config_path, &output),
    }
}

/// Read and validate a profile file
fn load_profile(path: &Path, reader: &ProfileReader) -> Result<Profile> {
    let profile = reader
        .read(path)
        .with_context(|| format!("Failed to read profile {}", path.display()))?;
    tracing::debug!(samples = profile.len(), "Loaded profile {}", path.display());
    Ok(profile)
}
