use serde::{Deserialize, Serialize};

use crate::error::{GravpolyError, Result};

/// Smallest vertex count that forms a polygon
pub const MIN_VERTICES: usize = 3;

/// A point of the subsurface cross-section, metres, `z` positive downward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub x: f64,
    pub z: f64,
}

impl Vertex {
    pub fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }
}

impl From<(f64, f64)> for Vertex {
    fn from((x, z): (f64, f64)) -> Self {
        Self { x, z }
    }
}

/// Unordered collection of vertices: the optimisable state of an inversion
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexSet {
    vertices: Vec<Vertex>,
}

impl VertexSet {
    pub fn new(vertices: Vec<Vertex>) -> Self {
        Self { vertices }
    }

    pub fn from_pairs(pairs: &[(f64, f64)]) -> Self {
        Self { vertices: pairs.iter().copied().map(Vertex::from).collect() }
    }

    /// Rebuild a vertex set from an interleaved `[x0, z0, x1, z1, ...]` vector.
    /// A trailing unpaired value is ignored.
    pub fn from_flat(flat: &[f64]) -> Self {
        debug_assert!(flat.len() % 2 == 0, "flat vertex vector must have even length");
        Self { vertices: flat.chunks_exact(2).map(|c| Vertex::new(c[0], c[1])).collect() }
    }

    /// Interleaved `[x0, z0, x1, z1, ...]` representation
    pub fn to_flat(&self) -> Vec<f64> {
        self.vertices.iter().flat_map(|v| [v.x, v.z]).collect()
    }

    /// Check that the set can form a polygon below the observation surface
    pub fn validate(&self) -> Result<()> {
        if self.vertices.len() < MIN_VERTICES {
            return Err(GravpolyError::TooFewVertices { found: self.vertices.len() });
        }
        if let Some(index) = self.vertices.iter().position(|v| !v.x.is_finite() || !v.z.is_finite())
        {
            return Err(GravpolyError::NonFiniteValue { what: "vertex".to_string(), index });
        }
        if let Some(index) = self.vertices.iter().position(|v| v.z < 0.0) {
            return Err(GravpolyError::VertexAboveSurface { index, z: self.vertices[index].z });
        }
        Ok(())
    }

    /// Arithmetic mean of the vertex coordinates
    pub fn centroid(&self) -> Option<Vertex> {
        if self.vertices.is_empty() {
            return None;
        }
        let n = self.vertices.len() as f64;
        let (sx, sz) = self.vertices.iter().fold((0.0, 0.0), |(sx, sz), v| (sx + v.x, sz + v.z));
        Some(Vertex::new(sx / n, sz / n))
    }

    pub fn as_slice(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Vertex> {
        self.vertices.iter()
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn into_inner(self) -> Vec<Vertex> {
        self.vertices
    }
}

impl From<Vec<Vertex>> for VertexSet {
    fn from(vertices: Vec<Vertex>) -> Self {
        Self::new(vertices)
    }
}
