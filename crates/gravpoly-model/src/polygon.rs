//! Angular ordering of unordered vertex sets into closed rings

use gravpoly_core::models::{Polygon, Vertex, VertexSet};

/// Orders vertices by angle around their centroid.
///
/// The ring is simple only when the vertex set is star-shaped about its
/// centroid; other configurations produce a self-intersecting ring rather
/// than an error. Check [`Polygon::is_simple`] when that matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct PolygonBuilder;

impl PolygonBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Sort by ascending `atan2(z - cz, x - cx)` and close the ring.
    ///
    /// Vertices with equal angles keep their input order. An empty set gives
    /// an empty ring; callers enforce the three-vertex minimum.
    pub fn build(&self, vertices: &VertexSet) -> Polygon {
        let Some(centroid) = vertices.centroid() else {
            return Polygon::close(Vec::new());
        };

        let mut keyed: Vec<(f64, Vertex)> = vertices
            .iter()
            .map(|v| ((v.z - centroid.z).atan2(v.x - centroid.x), *v))
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

        Polygon::close(keyed.into_iter().map(|(_, v)| v).collect())
    }

    /// Build from an interleaved `[x0, z0, x1, z1, ...]` candidate vector
    pub fn build_flat(&self, flat: &[f64]) -> Polygon {
        self.build(&VertexSet::from_flat(flat))
    }
}

/// Shorthand for `PolygonBuilder::new().build(vertices)`
pub fn build_polygon(vertices: &VertexSet) -> Polygon {
    PolygonBuilder.build(vertices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_order_and_closure() {
        let vertices = VertexSet::from_pairs(&[(4000.0, 3000.0), (6000.0, 0.0), (2000.0, 0.0)]);
        let poly = build_polygon(&vertices);

        assert_eq!(poly.ring().len(), 4);
        assert_eq!(poly.ring()[0], Vertex::new(2000.0, 0.0));
        assert_eq!(poly.ring()[1], Vertex::new(6000.0, 0.0));
        assert_eq!(poly.ring()[2], Vertex::new(4000.0, 3000.0));
        assert_eq!(poly.ring()[3], poly.ring()[0]);
    }

    #[test]
    fn test_ring_has_positive_signed_area() {
        let vertices = VertexSet::from_pairs(&[
            (0.0, 10.0),
            (10.0, 10.0),
            (0.0, 0.0),
            (10.0, 0.0),
        ]);
        let poly = build_polygon(&vertices);
        assert!(poly.signed_area() > 0.0);
        assert!(poly.is_simple());
        assert!((poly.signed_area() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_non_star_shaped_set_is_not_rejected() {
        // Deep notch: the centroid sits outside the notch's visibility
        let vertices = VertexSet::from_pairs(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
            (9.0, 10.0),
            (9.0, 1.0),
            (1.0, 1.0),
            (1.0, 10.0),
            (0.0, 10.0),
        ]);
        let poly = build_polygon(&vertices);
        assert_eq!(poly.vertex_count(), 8);
        assert_eq!(poly.ring().first(), poly.ring().last());
    }

    #[test]
    fn test_build_flat_matches_build() {
        let flat = [1.0, 5.0, 7.0, 2.0, 4.0, 9.0];
        assert_eq!(
            PolygonBuilder::new().build_flat(&flat),
            build_polygon(&VertexSet::from_flat(&flat))
        );
    }

    #[test]
    fn test_empty_set() {
        assert!(build_polygon(&VertexSet::default()).ring().is_empty());
    }
}
