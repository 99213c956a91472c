//! Inspect command implementation

use crate::cli::InspectArgs;
use crate::output::OutputWriter;
use crate::output_types::{InspectOutput, ResidualRow, VertexRow};
use anyhow::{Context, Result};
use gravpoly_core::formats::load_model;

pub fn execute(args: InspectArgs, output: &OutputWriter) -> Result<()> {
    let model = load_model(&args.model)
        .with_context(|| format!("Failed to load model file {}", args.model.display()))?;
    let result = &model.result;

    let summary = InspectOutput {
        version: model.version,
        created_at: model.created_at,
        profile_name: model.profile_name.clone(),
        density: model.density,
        vertices: result.polygon.vertices().to_vec(),
        signed_area: result.polygon.signed_area(),
        termination: result.termination.as_str().to_string(),
        misfit: result.misfit,
        rms_residual: result.rms_residual(),
        grid_points: result.grid.len(),
        generations: result.generations,
        evaluations: result.evaluations,
    };

    if output.is_json() {
        output.result(summary)?;
        return Ok(());
    }

    output.section("Model");
    output.kv("File version", summary.version);
    output.kv("Created", summary.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    if let Some(name) = &summary.profile_name {
        output.kv("Profile", name);
    }
    output.kv("Density contrast", format!("{} kg/m^3", summary.density));

    output.section("Body");
    output.kv("Area", format!("{:.1} m^2", summary.signed_area.abs()));
    output.table(VertexRow::from_vertices(&summary.vertices));

    output.section("Fit");
    output.kv("Termination", &summary.termination);
    output.kv("Misfit", format!("{:.4} mGal", summary.misfit));
    output.kv("RMS residual", format!("{:.4} mGal", summary.rms_residual));
    output.kv("Grid points", summary.grid_points);
    output.kv("Generations", summary.generations);

    if args.show_points {
        output.section("Points");
        output.table(ResidualRow::from_curves(
            result.grid.points(),
            &result.observed,
            &result.modeled,
        ));
    }

    Ok(())
}
