//! Sensitivity of modelled gravity to vertex coordinates
//!
//! Forward differences of the Talwani response with respect to every vertex
//! coordinate of an ordered polygon. The ring order is held fixed while a
//! coordinate is perturbed, so the matrix describes the body as drawn rather
//! than a rebuilt ring.

use gravpoly_core::error::{GravpolyError, Result};
use gravpoly_core::models::{ObservationGrid, Polygon, Vertex};

use crate::talwani::gravity;

/// Default finite-difference step, metres
pub const DEFAULT_STEP: f64 = 1e-6;

/// Dense row-major matrix: one row per observation point, columns
/// `[x0, z0, x1, z1, ...]`, mGal per metre
#[derive(Debug, Clone, PartialEq)]
pub struct Jacobian {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Jacobian {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn column(&self, col: usize) -> Vec<f64> {
        (0..self.rows).map(|r| self.get(r, col)).collect()
    }
}

/// Forward-difference Jacobian of `gravity(grid, polygon, density)` with
/// respect to the polygon's vertex coordinates. `step` must be finite and
/// positive.
pub fn vertex_jacobian(
    grid: &ObservationGrid,
    polygon: &Polygon,
    density: f64,
    step: f64,
) -> Result<Jacobian> {
    if !step.is_finite() || step <= 0.0 {
        return Err(GravpolyError::ConfigInvalid {
            key: "step".to_string(),
            reason: format!("finite-difference step must be finite and > 0, got {}", step),
        });
    }

    let n_vertices = polygon.vertex_count();
    let rows = grid.len();
    let cols = 2 * n_vertices;
    let base = gravity(grid, polygon, density);

    let mut data = vec![0.0; rows * cols];
    for col in 0..cols {
        let perturbed = perturb(polygon, col / 2, col % 2 == 1, step);
        let shifted = gravity(grid, &perturbed, density);
        for (row, (g1, g0)) in shifted.iter().zip(&base).enumerate() {
            data[row * cols + col] = (g1 - g0) / step;
        }
    }

    tracing::debug!(rows, cols, step, "Computed vertex Jacobian");
    Ok(Jacobian { rows, cols, data })
}

/// Copy of `polygon` with one coordinate moved; the closing point follows
/// vertex 0
fn perturb(polygon: &Polygon, vertex: usize, depth: bool, step: f64) -> Polygon {
    let mut ordered: Vec<Vertex> = polygon.vertices().to_vec();
    if depth {
        ordered[vertex].z += step;
    } else {
        ordered[vertex].x += step;
    }
    Polygon::close(ordered)
}
