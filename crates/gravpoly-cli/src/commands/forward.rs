//! Forward command implementation

use super::load_profile;
use crate::cli::ForwardArgs;
use crate::config_loader::load_config_with_overrides;
use crate::output::OutputWriter;
use crate::output_types::{peak, ComparisonOutput, ForwardOutput, PointRow, VertexRow};
use anyhow::Result;
use gravpoly_core::config::CliConfigOverrides;
use gravpoly_core::formats::ProfileReader;
use gravpoly_core::models::{ObservationGrid, VertexSet};
use gravpoly_inversion::engine::default_grid;
use gravpoly_inversion::misfit;
use gravpoly_model::{build_polygon, gravity, ProfileResampler};
use std::path::Path;

pub fn execute(args: ForwardArgs, config_path: Option<&Path>, output: &OutputWriter) -> Result<()> {
    let config = load_config_with_overrides(
        config_path,
        CliConfigOverrides { density: args.density, grid_points: args.points, ..Default::default() },
    )?;
    config.validate()?;
    let density = config.density.value;

    let vertices = VertexSet::from_pairs(&args.vertices);
    vertices.validate()?;
    let polygon = build_polygon(&vertices);
    if !polygon.is_simple() {
        output.warning(
            "Vertices ordered around their centroid form a self-intersecting outline; \
             the anomaly is that of the ordered ring",
        );
    }

    // Observed curve on the same grid when a profile is given
    let (grid, observed) = match &args.profile {
        Some(path) => {
            let reader = ProfileReader::new().with_gravity_unit(args.gravity_unit.into());
            let profile = load_profile(path, &reader)?;
            let grid = default_grid(&profile, config.grid_points.value)?;
            let observed =
                ProfileResampler::new(config.smoothing.value).resample(&profile, &grid)?;
            (grid, Some((profile.name().map(String::from), observed)))
        }
        None => (ObservationGrid::around_vertices(&vertices)?, None),
    };

    let gz = gravity(&grid, &polygon, density);
    let comparison = observed.map(|(profile_name, observed)| ComparisonOutput {
        profile_name,
        misfit: misfit(&gz, &observed),
        rms_residual: rms_difference(&observed, &gz),
    });

    let result = ForwardOutput {
        density,
        vertices: polygon.vertices().to_vec(),
        signed_area: polygon.signed_area(),
        simple: polygon.is_simple(),
        peak: peak(grid.points(), &gz),
        grid: grid.points().to_vec(),
        gravity: gz,
        comparison,
    };

    if output.is_json() {
        output.result(result)?;
        return Ok(());
    }

    output.section("Body");
    output.kv("Density contrast", format!("{} kg/m^3", result.density));
    output.kv("Area", format!("{:.1} m^2", result.signed_area.abs()));
    output.table(VertexRow::from_vertices(&result.vertices));

    output.section("Anomaly");
    let (start, end) = grid.span();
    output.kv(
        "Grid",
        format!("{} points, {:.3} to {:.3} km", grid.len(), start / 1000.0, end / 1000.0),
    );
    output.kv(
        "Peak",
        format!("{:.4} mGal at {:.3} km", result.peak.gravity, result.peak.distance / 1000.0),
    );

    if let Some(comparison) = &result.comparison {
        output.section("Profile Comparison");
        if let Some(name) = &comparison.profile_name {
            output.kv("Profile", name);
        }
        output.kv("Misfit", format!("{:.4} mGal", comparison.misfit));
        output.kv("RMS residual", format!("{:.4} mGal", comparison.rms_residual));
    }

    if args.show_points {
        output.section("Points");
        output.table(PointRow::from_curve(&result.grid, &result.gravity));
    }

    Ok(())
}

fn rms_difference(a: &[f64], b: &[f64]) -> f64 {
    if a.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
    (sum_sq / a.len() as f64).sqrt()
}
