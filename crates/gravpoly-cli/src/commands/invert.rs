//! Invert command implementation

use super::load_profile;
use crate::cli::InvertArgs;
use crate::config_loader::load_config_with_overrides;
use crate::output::OutputWriter;
use crate::output_types::{InvertOutput, VertexRow};
use crate::progress::InversionProgressBar;
use anyhow::{Context, Result};
use gravpoly_core::formats::{save_model, ModelFile, ProfileReader};
use gravpoly_inversion::InversionEngine;
use std::path::Path;
use std::time::Instant;

pub fn execute(args: InvertArgs, config_path: Option<&Path>, output: &OutputWriter) -> Result<()> {
    let config = load_config_with_overrides(config_path, args.overrides.into())?;
    config.validate()?;

    let reader = ProfileReader::new().with_gravity_unit(args.gravity_unit.into());
    let profile = load_profile(&args.profile, &reader)?;

    let engine = InversionEngine::from_config(&config);
    let progress = if output.is_json() || args.no_progress {
        InversionProgressBar::hidden()
    } else {
        InversionProgressBar::new(config.max_generations.value)
    };

    let started = Instant::now();
    let result = engine
        .invert_profile(&profile, &config, |p| progress.update(p))
        .context("Inversion failed")?;
    let elapsed = started.elapsed();
    progress.finish(&result);

    let density = config.density.value;
    let profile_name = profile.name().map(String::from);

    let model_file = match &args.output {
        Some(path) => {
            let model = ModelFile::new(result.clone(), density, profile_name.clone());
            save_model(path, &model)
                .with_context(|| format!("Failed to write model file {}", path.display()))?;
            Some(path.display().to_string())
        }
        None => None,
    };

    let summary = InvertOutput {
        profile_name,
        density,
        vertices: result.polygon.vertices().to_vec(),
        termination: result.termination.as_str().to_string(),
        misfit: result.misfit,
        mean_misfit: result.mean_misfit(),
        rms_residual: result.rms_residual(),
        generations: result.generations,
        evaluations: result.evaluations,
        elapsed_secs: elapsed.as_secs_f64(),
        model_file,
    };

    if output.is_json() {
        output.result(summary)?;
        return Ok(());
    }

    output.section("Recovered Body");
    output.table(VertexRow::from_vertices(&summary.vertices));

    output.section("Fit");
    output.kv("Termination", &summary.termination);
    output.kv("Misfit", format!("{:.4} mGal ({:.4} per point)", summary.misfit, summary.mean_misfit));
    output.kv("RMS residual", format!("{:.4} mGal", summary.rms_residual));
    output.kv("Generations", summary.generations);
    output.kv("Evaluations", summary.evaluations);
    output.kv("Elapsed", format!("{:.2}s", summary.elapsed_secs));

    if !result.converged() {
        output.warning(format!(
            "Stopped before convergence ({}); the body is the best found so far",
            summary.termination
        ));
    }

    if let Some(path) = &summary.model_file {
        output.success(format!("Model saved to {}", path));
    }

    Ok(())
}
