//! Resample command implementation

use super::load_profile;
use crate::cli::ResampleArgs;
use crate::config_loader::load_config_with_overrides;
use crate::output::OutputWriter;
use crate::output_types::{PointRow, ResampleOutput};
use anyhow::Result;
use gravpoly_core::config::CliConfigOverrides;
use gravpoly_core::formats::ProfileReader;
use gravpoly_inversion::engine::default_grid;
use gravpoly_model::SmoothingSpline;
use std::path::Path;

pub fn execute(args: ResampleArgs, config_path: Option<&Path>, output: &OutputWriter) -> Result<()> {
    let config = load_config_with_overrides(
        config_path,
        CliConfigOverrides {
            grid_points: args.points,
            smoothing: args.smoothing,
            ..Default::default()
        },
    )?;
    config.validate()?;

    let reader = ProfileReader::new().with_gravity_unit(args.gravity_unit.into());
    let profile = load_profile(&args.profile, &reader)?;
    let grid = default_grid(&profile, config.grid_points.value)?;

    let smoothing = config.smoothing.value.unwrap_or(profile.len() as f64);
    let spline = SmoothingSpline::fit(&profile.distances(), &profile.gravity(), Some(smoothing))?;
    let gravity: Vec<f64> = grid.iter().map(|x| spline.evaluate(x)).collect();

    let result = ResampleOutput {
        profile_name: profile.name().map(String::from),
        samples: profile.len(),
        smoothing,
        rss: spline.rss(),
        grid: grid.points().to_vec(),
        gravity,
    };

    if output.is_json() {
        output.result(result)?;
        return Ok(());
    }

    output.section("Profile");
    if let Some(name) = &result.profile_name {
        output.kv("Name", name);
    }
    let (start, end) = profile.span();
    output.kv(
        "Samples",
        format!("{} from {:.3} to {:.3} km", result.samples, start / 1000.0, end / 1000.0),
    );

    output.section("Smoothing Spline");
    output.kv("Target RSS", format!("{}", result.smoothing));
    output.kv("Achieved RSS", format!("{:.6}", result.rss));
    output.kv("Grid points", result.grid.len());

    if args.show_points {
        output.section("Points");
        output.table(PointRow::from_curve(&result.grid, &result.gravity));
    }

    Ok(())
}
