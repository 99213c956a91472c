//! Structured output types for JSON mode and tables

use chrono::{DateTime, Utc};
use gravpoly_core::models::Vertex;
use serde::Serialize;
use tabled::Tabled;

/// Output for forward command
#[derive(Debug, Serialize)]
pub struct ForwardOutput {
    pub density: f64,
    /// Ring order, without the closing vertex
    pub vertices: Vec<Vertex>,
    pub signed_area: f64,
    pub simple: bool,
    /// Grid distances in metres
    pub grid: Vec<f64>,
    /// Anomaly in mGal
    pub gravity: Vec<f64>,
    pub peak: PeakOutput,
    pub comparison: Option<ComparisonOutput>,
}

#[derive(Debug, Serialize)]
pub struct PeakOutput {
    pub distance: f64,
    pub gravity: f64,
}

/// Fit of a forward curve against a loaded profile
#[derive(Debug, Serialize)]
pub struct ComparisonOutput {
    pub profile_name: Option<String>,
    pub misfit: f64,
    pub rms_residual: f64,
}

/// Output for resample command
#[derive(Debug, Serialize)]
pub struct ResampleOutput {
    pub profile_name: Option<String>,
    pub samples: usize,
    /// Residual sum of squares target
    pub smoothing: f64,
    /// Achieved residual sum of squares at the samples
    pub rss: f64,
    pub grid: Vec<f64>,
    pub gravity: Vec<f64>,
}

/// Output for invert command
#[derive(Debug, Serialize)]
pub struct InvertOutput {
    pub profile_name: Option<String>,
    pub density: f64,
    pub vertices: Vec<Vertex>,
    pub termination: String,
    pub misfit: f64,
    pub mean_misfit: f64,
    pub rms_residual: f64,
    pub generations: usize,
    pub evaluations: usize,
    pub elapsed_secs: f64,
    pub model_file: Option<String>,
}

/// Output for inspect command
#[derive(Debug, Serialize)]
pub struct InspectOutput {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub profile_name: Option<String>,
    pub density: f64,
    pub vertices: Vec<Vertex>,
    pub signed_area: f64,
    pub termination: String,
    pub misfit: f64,
    pub rms_residual: f64,
    pub grid_points: usize,
    pub generations: usize,
    pub evaluations: usize,
}

/// Output for config command
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub values: Vec<ConfigRow>,
}

#[derive(Debug, Serialize, Tabled)]
pub struct ConfigRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

#[derive(Debug, Serialize, Tabled)]
pub struct VertexRow {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "x (m)")]
    pub x: String,
    #[tabled(rename = "z (m)")]
    pub z: String,
}

impl VertexRow {
    pub fn from_vertices(vertices: &[Vertex]) -> Vec<Self> {
        vertices
            .iter()
            .enumerate()
            .map(|(index, v)| Self { index, x: format!("{:.1}", v.x), z: format!("{:.1}", v.z) })
            .collect()
    }
}

/// One grid point of a gravity curve
#[derive(Debug, Serialize, Tabled)]
pub struct PointRow {
    #[tabled(rename = "Distance (km)")]
    pub distance: String,
    #[tabled(rename = "gz (mGal)")]
    pub gravity: String,
}

impl PointRow {
    pub fn from_curve(grid: &[f64], gravity: &[f64]) -> Vec<Self> {
        grid.iter()
            .zip(gravity)
            .map(|(x, g)| Self { distance: format!("{:.3}", x / 1000.0), gravity: format!("{:.4}", g) })
            .collect()
    }
}

/// One grid point of an observed / modelled comparison
#[derive(Debug, Serialize, Tabled)]
pub struct ResidualRow {
    #[tabled(rename = "Distance (km)")]
    pub distance: String,
    #[tabled(rename = "Observed")]
    pub observed: String,
    #[tabled(rename = "Modelled")]
    pub modeled: String,
    #[tabled(rename = "Residual")]
    pub residual: String,
}

impl ResidualRow {
    pub fn from_curves(grid: &[f64], observed: &[f64], modeled: &[f64]) -> Vec<Self> {
        grid.iter()
            .zip(observed.iter().zip(modeled))
            .map(|(x, (o, m))| Self {
                distance: format!("{:.3}", x / 1000.0),
                observed: format!("{:.4}", o),
                modeled: format!("{:.4}", m),
                residual: format!("{:.4}", o - m),
            })
            .collect()
    }
}

/// Largest-magnitude point of a curve
pub fn peak(grid: &[f64], gravity: &[f64]) -> PeakOutput {
    let mut best = PeakOutput { distance: f64::NAN, gravity: 0.0 };
    for (x, g) in grid.iter().zip(gravity) {
        if best.distance.is_nan() || g.abs() > best.gravity.abs() {
            best = PeakOutput { distance: *x, gravity: *g };
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_picks_largest_magnitude() {
        let p = peak(&[0.0, 1.0, 2.0], &[1.0, -3.0, 2.0]);
        assert_eq!(p.distance, 1.0);
        assert_eq!(p.gravity, -3.0);
    }

    #[test]
    fn test_rows_format_kilometres() {
        let rows = PointRow::from_curve(&[1500.0], &[2.5]);
        assert_eq!(rows[0].distance, "1.500");
        assert_eq!(rows[0].gravity, "2.5000");

        let rows = ResidualRow::from_curves(&[0.0], &[3.0], &[2.0]);
        assert_eq!(rows[0].residual, "1.0000");
    }
}
