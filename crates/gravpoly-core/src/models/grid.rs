use serde::{Deserialize, Serialize};

use crate::error::{GravpolyError, Result};
use crate::models::vertex::VertexSet;

/// Number of display points per vertex when modelling a hand-placed body
const POINTS_PER_VERTEX: usize = 100;

/// Strictly increasing x-coordinates (metres along the profile) at which
/// gravity is modelled and compared
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct ObservationGrid {
    points: Vec<f64>,
}

impl ObservationGrid {
    /// Create a grid from explicit points
    pub fn new(points: Vec<f64>) -> Result<Self> {
        if points.is_empty() {
            return Err(GravpolyError::EmptyInput { what: "observation grid".to_string() });
        }

        if let Some(index) = points.iter().position(|x| !x.is_finite()) {
            return Err(GravpolyError::NonFiniteValue {
                what: "observation point".to_string(),
                index,
            });
        }

        if let Some(index) = points.windows(2).position(|w| w[1] <= w[0]) {
            return Err(GravpolyError::GridInvalid {
                reason: format!(
                    "points must be strictly increasing, point {} ({}) follows {}",
                    index + 1,
                    points[index + 1],
                    points[index]
                ),
            });
        }

        Ok(Self { points })
    }

    /// `count` evenly spaced points from `start` to `end` inclusive
    pub fn linspace(start: f64, end: f64, count: usize) -> Result<Self> {
        if count < 2 {
            return Err(GravpolyError::GridInvalid {
                reason: format!("at least 2 points are required, got {}", count),
            });
        }
        if !start.is_finite() || !end.is_finite() || end <= start {
            return Err(GravpolyError::GridInvalid {
                reason: format!("invalid range {} to {}", start, end),
            });
        }

        let step = (end - start) / (count - 1) as f64;
        let mut points: Vec<f64> = (0..count).map(|i| start + step * i as f64).collect();
        points[count - 1] = end;

        Self::new(points)
    }

    /// Display grid for a hand-placed body with no profile loaded.
    ///
    /// Spans half the largest vertex abscissa beyond the outermost vertices on
    /// each side, with 100 points per vertex.
    pub fn around_vertices(vertices: &VertexSet) -> Result<Self> {
        if vertices.is_empty() {
            return Err(GravpolyError::EmptyInput { what: "vertex set".to_string() });
        }

        let min_x = vertices.iter().map(|v| v.x).fold(f64::INFINITY, f64::min);
        let max_x = vertices.iter().map(|v| v.x).fold(f64::NEG_INFINITY, f64::max);
        let pad = 0.5 * max_x.abs();

        Self::linspace(min_x - pad, max_x + pad, POINTS_PER_VERTEX * vertices.len())
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().copied()
    }

    /// First and last point
    pub fn span(&self) -> (f64, f64) {
        (self.points[0], self.points[self.points.len() - 1])
    }
}

impl TryFrom<Vec<f64>> for ObservationGrid {
    type Error = GravpolyError;

    fn try_from(points: Vec<f64>) -> Result<Self> {
        Self::new(points)
    }
}

impl From<ObservationGrid> for Vec<f64> {
    fn from(grid: ObservationGrid) -> Self {
        grid.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vertex::Vertex;

    #[test]
    fn test_linspace() {
        let grid = ObservationGrid::linspace(0.0, 10_000.0, 1000).unwrap();
        assert_eq!(grid.len(), 1000);
        assert_eq!(grid.span(), (0.0, 10_000.0));
        assert!(grid.points().windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_linspace_rejects_bad_input() {
        assert!(ObservationGrid::linspace(0.0, 1.0, 1).is_err());
        assert!(ObservationGrid::linspace(5.0, 5.0, 10).is_err());
        assert!(ObservationGrid::linspace(0.0, f64::NAN, 10).is_err());
    }

    #[test]
    fn test_new_requires_strictly_increasing() {
        assert!(ObservationGrid::new(vec![0.0, 1.0, 1.0]).is_err());
        assert!(ObservationGrid::new(vec![2.0, 1.0]).is_err());
        assert!(ObservationGrid::new(vec![]).is_err());
        assert!(ObservationGrid::new(vec![0.0, 0.5, 2.0]).is_ok());
    }

    #[test]
    fn test_around_vertices() {
        let vertices = VertexSet::new(vec![
            Vertex::new(100.0, 10.0),
            Vertex::new(300.0, 10.0),
            Vertex::new(200.0, 80.0),
        ]);
        let grid = ObservationGrid::around_vertices(&vertices).unwrap();
        assert_eq!(grid.len(), 300);
        assert_eq!(grid.span(), (-50.0, 450.0));
    }

    #[test]
    fn test_serde_validates() {
        let grid: ObservationGrid = serde_json::from_str("[0.0, 1.0, 2.0]").unwrap();
        assert_eq!(grid.len(), 3);
        assert!(serde_json::from_str::<ObservationGrid>("[1.0, 0.0]").is_err());
    }
}
