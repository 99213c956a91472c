//! Closed polygon rings and conversions to the `geo` crate

use geo::{Area, BoundingRect, Coord, Intersects, Line, LineString};
use serde::{Deserialize, Serialize};

use crate::error::{GravpolyError, Result};
use crate::models::vertex::{Vertex, VertexSet, MIN_VERTICES};

/// Closed, ordered ring of vertices: the first and last points are identical.
///
/// Coordinates are `(x, z)` with `z` positive downward. Treating them as a
/// plain `(x, y)` plane, a ring with positive [`signed_area`](Self::signed_area)
/// yields positive gravity for a positive density contrast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vertex>", into = "Vec<Vertex>")]
pub struct Polygon {
    ring: Vec<Vertex>,
}

impl Polygon {
    /// Close an ordered sequence of vertices by repeating the first one
    pub fn close(mut ordered: Vec<Vertex>) -> Self {
        if let Some(first) = ordered.first().copied() {
            ordered.push(first);
        }
        Self { ring: ordered }
    }

    /// Wrap an already closed ring
    pub fn from_closed_ring(ring: Vec<Vertex>) -> Result<Self> {
        if ring.len() < MIN_VERTICES + 1 {
            return Err(GravpolyError::TooFewVertices { found: ring.len().saturating_sub(1) });
        }
        if ring.first() != ring.last() {
            return Err(GravpolyError::ConfigInvalid {
                key: "polygon".to_string(),
                reason: "ring must be closed (first point == last point)".to_string(),
            });
        }
        Ok(Self { ring })
    }

    /// Full closed ring, `vertex_count() + 1` points
    pub fn ring(&self) -> &[Vertex] {
        &self.ring
    }

    /// Ordered vertices without the closing duplicate
    pub fn vertices(&self) -> &[Vertex] {
        &self.ring[..self.vertex_count()]
    }

    pub fn vertex_count(&self) -> usize {
        self.ring.len().saturating_sub(1)
    }

    /// Consecutive `(v, v+1)` pairs of the closed ring
    pub fn edges(&self) -> impl Iterator<Item = (Vertex, Vertex)> + '_ {
        self.ring.windows(2).map(|w| (w[0], w[1]))
    }

    pub fn to_vertex_set(&self) -> VertexSet {
        VertexSet::new(self.vertices().to_vec())
    }

    /// Convert to a `geo::Polygon` with `z` mapped onto the `y` axis
    pub fn to_geo(&self) -> geo::Polygon<f64> {
        let coords: Vec<Coord<f64>> = self.ring.iter().map(|v| Coord { x: v.x, y: v.z }).collect();
        geo::Polygon::new(LineString::new(coords), vec![])
    }

    /// Signed area in m², positive for the ascending-angle orientation
    pub fn signed_area(&self) -> f64 {
        self.to_geo().signed_area()
    }

    /// Axis-aligned extent as `(min, max)` corners
    pub fn bounding_box(&self) -> Option<(Vertex, Vertex)> {
        self.to_geo()
            .bounding_rect()
            .map(|r| (Vertex::new(r.min().x, r.min().y), Vertex::new(r.max().x, r.max().y)))
    }

    /// True when no two non-adjacent edges touch.
    ///
    /// Angular ordering only guarantees this for vertex sets that are
    /// star-shaped about their centroid.
    pub fn is_simple(&self) -> bool {
        let lines: Vec<Line<f64>> = self
            .edges()
            .map(|(a, b)| Line::new(Coord { x: a.x, y: a.z }, Coord { x: b.x, y: b.z }))
            .collect();
        let n = lines.len();

        for i in 0..n {
            for j in (i + 2)..n {
                // First and last edges share the closing vertex
                if i == 0 && j == n - 1 {
                    continue;
                }
                if lines[i].intersects(&lines[j]) {
                    return false;
                }
            }
        }
        true
    }
}

impl TryFrom<Vec<Vertex>> for Polygon {
    type Error = GravpolyError;

    fn try_from(ring: Vec<Vertex>) -> Result<Self> {
        Self::from_closed_ring(ring)
    }
}

impl From<Polygon> for Vec<Vertex> {
    fn from(polygon: Polygon) -> Self {
        polygon.ring
    }
}
