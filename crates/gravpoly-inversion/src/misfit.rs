//! Misfit between modelled and observed gravity
//!
//! The misfit compares magnitudes, `Σ | |modelled| − |observed| |`, so a ring
//! traversed in the opposite direction (which flips the sign of the modelled
//! curve) scores the same as the original. A body and its sign-flipped
//! counterpart are therefore indistinguishable to the inversion.

use gravpoly_core::error::{GravpolyError, Result};
use gravpoly_core::models::{ObservationGrid, Polygon, Profile, VertexSet};
use gravpoly_model::{build_polygon, gravity, ProfileResampler};

use crate::evolution::CostFunction;

/// Aggregate misfit in mGal summed over points; `+∞` if any value is
/// non-finite
pub fn misfit(modeled: &[f64], observed: &[f64]) -> f64 {
    let mut total = 0.0;
    for (m, o) in modeled.iter().zip(observed) {
        if !m.is_finite() {
            return f64::INFINITY;
        }
        total += (m.abs() - o.abs()).abs();
    }
    total
}

/// Cost of candidate vertex sets against a fixed observed curve
#[derive(Debug, Clone)]
pub struct MisfitObjective {
    grid: ObservationGrid,
    observed: Vec<f64>,
    density: f64,
}

impl MisfitObjective {
    pub fn new(grid: ObservationGrid, observed: Vec<f64>, density: f64) -> Result<Self> {
        if !density.is_finite() || density <= 0.0 {
            return Err(GravpolyError::InvalidDensity { value: density });
        }
        if observed.len() != grid.len() {
            return Err(GravpolyError::GridInvalid {
                reason: format!(
                    "{} observed values for {} grid points",
                    observed.len(),
                    grid.len()
                ),
            });
        }
        if let Some(index) = observed.iter().position(|v| !v.is_finite()) {
            return Err(GravpolyError::NonFiniteValue { what: "observed gravity".to_string(), index });
        }

        Ok(Self { grid, observed, density })
    }

    /// Resample `profile` onto `grid` and use it as the observed curve
    pub fn from_profile(
        profile: &Profile,
        grid: ObservationGrid,
        density: f64,
        resampler: &ProfileResampler,
    ) -> Result<Self> {
        let observed = resampler.resample(profile, &grid)?;
        Self::new(grid, observed, density)
    }

    pub fn grid(&self) -> &ObservationGrid {
        &self.grid
    }

    pub fn observed(&self) -> &[f64] {
        &self.observed
    }

    pub fn density(&self) -> f64 {
        self.density
    }

    /// Polygon built from `vertices` and its gravity on the grid
    pub fn model(&self, vertices: &VertexSet) -> (Polygon, Vec<f64>) {
        let polygon = build_polygon(vertices);
        let modeled = gravity(&self.grid, &polygon, self.density);
        (polygon, modeled)
    }

    pub fn cost(&self, vertices: &VertexSet) -> f64 {
        let (_, modeled) = self.model(vertices);
        misfit(&modeled, &self.observed)
    }
}

impl CostFunction for MisfitObjective {
    /// Interleaved `[x0, z0, x1, z1, ...]` candidate
    fn cost(&self, candidate: &[f64]) -> f64 {
        MisfitObjective::cost(self, &VertexSet::from_flat(candidate))
    }
}
