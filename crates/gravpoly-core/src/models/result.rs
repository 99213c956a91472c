use serde::{Deserialize, Serialize};

use crate::models::grid::ObservationGrid;
use crate::models::polygon::Polygon;
use crate::models::vertex::VertexSet;

/// Why an inversion run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// Population spread fell below the configured tolerance
    Converged,
    /// Generation budget exhausted
    MaxGenerations,
    /// Wall-clock limit reached
    TimeLimit,
    /// Caller requested a stop
    Cancelled,
}

impl Termination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Termination::Converged => "converged",
            Termination::MaxGenerations => "max-generations",
            Termination::TimeLimit => "time-limit",
            Termination::Cancelled => "cancelled",
        }
    }
}

/// Best body found by an inversion run.
///
/// Returned for every termination reason; `misfit` tells the caller how good
/// the fit is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub vertices: VertexSet,
    pub polygon: Polygon,
    pub grid: ObservationGrid,
    /// Modelled gravity at `grid`, mGal
    pub modeled: Vec<f64>,
    /// Resampled observed gravity at `grid`, mGal
    pub observed: Vec<f64>,
    /// Aggregate misfit, mGal summed over grid points
    pub misfit: f64,
    pub generations: usize,
    pub evaluations: usize,
    pub termination: Termination,
}

impl OptimizationResult {
    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }

    /// Observed minus modelled gravity at each grid point
    pub fn residuals(&self) -> Vec<f64> {
        self.observed.iter().zip(&self.modeled).map(|(o, m)| o - m).collect()
    }

    /// Root-mean-square of the residuals, mGal
    pub fn rms_residual(&self) -> f64 {
        let residuals = self.residuals();
        if residuals.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = residuals.iter().map(|r| r * r).sum();
        (sum_sq / residuals.len() as f64).sqrt()
    }

    /// Misfit divided by the number of grid points
    pub fn mean_misfit(&self) -> f64 {
        if self.grid.is_empty() {
            0.0
        } else {
            self.misfit / self.grid.len() as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vertex::Vertex;

    fn result() -> OptimizationResult {
        let vertices = VertexSet::from_pairs(&[(0.0, 1.0), (2.0, 1.0), (1.0, 3.0)]);
        OptimizationResult {
            polygon: Polygon::close(vertices.as_slice().to_vec()),
            vertices,
            grid: ObservationGrid::new(vec![0.0, 1.0, 2.0, 3.0]).unwrap(),
            modeled: vec![1.0, 2.0, 3.0, 4.0],
            observed: vec![2.0, 2.0, 1.0, 4.0],
            misfit: 3.0,
            generations: 12,
            evaluations: 540,
            termination: Termination::MaxGenerations,
        }
    }

    #[test]
    fn test_residuals() {
        let r = result();
        assert_eq!(r.residuals(), vec![1.0, 0.0, -2.0, 0.0]);
        assert!((r.rms_residual() - (5.0f64 / 4.0).sqrt()).abs() < 1e-12);
        assert_eq!(r.mean_misfit(), 0.75);
        assert!(!r.converged());
    }

    #[test]
    fn test_json_roundtrip_keeps_fields() {
        let r = result();
        let json = serde_json::to_string(&r).unwrap();
        let back: OptimizationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
        assert_eq!(back.polygon.ring()[3], Vertex::new(0.0, 1.0));
    }
}
