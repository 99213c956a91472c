//! Property tests for polygon building and the Talwani forward model

use gravpoly_core::models::{ObservationGrid, VertexSet};
use gravpoly_model::{build_polygon, gravity, gravity_at};
use proptest::prelude::*;

const DENSITY: f64 = 450.0;

/// Whole-metre vertices keep centroid sums exact
fn vertex_set(min: usize, max: usize) -> impl Strategy<Value = VertexSet> {
    prop::collection::vec((-5000i32..5000, 0i32..5000), min..max).prop_map(|pairs| {
        let pairs: Vec<(f64, f64)> = pairs.into_iter().map(|(x, z)| (x as f64, z as f64)).collect();
        VertexSet::from_pairs(&pairs)
    })
}

fn triangle() -> impl Strategy<Value = VertexSet> {
    prop::collection::vec((2000i32..8000, 100i32..3000), 3).prop_map(|pairs| {
        let pairs: Vec<(f64, f64)> = pairs.into_iter().map(|(x, z)| (x as f64, z as f64)).collect();
        VertexSet::from_pairs(&pairs)
    })
}

proptest! {
    #[test]
    fn build_closes_ring(vertices in vertex_set(3, 16)) {
        let poly = build_polygon(&vertices);
        prop_assert_eq!(poly.ring().len(), vertices.len() + 1);
        prop_assert_eq!(poly.ring().first(), poly.ring().last());
    }

    #[test]
    fn build_is_idempotent(vertices in vertex_set(3, 16)) {
        let first = build_polygon(&vertices);
        let second = build_polygon(&first.to_vertex_set());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn symmetric_body_gives_symmetric_curve(
        x0 in 2000i32..8000,
        half_width in 100i32..2000,
        top in 10i32..1000,
        height in 100i32..3000,
    ) {
        // Diamond: no vertical or horizontal edges
        let (x0, w, top, h) = (x0 as f64, half_width as f64, top as f64, height as f64);
        let vertices = VertexSet::from_pairs(&[
            (x0, top),
            (x0 + w, top + h / 2.0),
            (x0, top + h),
            (x0 - w, top + h / 2.0),
        ]);
        let poly = build_polygon(&vertices);

        for k in 0..20 {
            let offset = k as f64 * 397.0 + 0.37;
            let right = gravity_at(x0 + offset, &poly, DENSITY);
            let left = gravity_at(x0 - offset, &poly, DENSITY);
            prop_assert!(
                (right - left).abs() <= 1e-9 * right.abs() + 1e-12,
                "offset {}: {} vs {}", offset, right, left
            );
        }
    }

    #[test]
    fn far_field_decays_monotonically(vertices in triangle()) {
        let poly = build_polygon(&vertices);
        prop_assume!(poly.signed_area().abs() > 1e5);

        let right = ObservationGrid::linspace(20_000.0, 70_000.0, 11).unwrap();
        let gz = gravity(&right, &poly, DENSITY);
        for pair in gz.windows(2) {
            prop_assert!(pair[1].abs() <= pair[0].abs(), "{:?}", gz);
        }

        let left: Vec<f64> = (0..11).map(|k| -10_000.0 - 5000.0 * k as f64).collect();
        let gz: Vec<f64> = left.iter().map(|&xp| gravity_at(xp, &poly, DENSITY)).collect();
        for pair in gz.windows(2) {
            prop_assert!(pair[1].abs() <= pair[0].abs(), "{:?}", gz);
        }
    }

    #[test]
    fn built_ring_attracts_downward(vertices in triangle()) {
        let poly = build_polygon(&vertices);
        prop_assume!(poly.signed_area().abs() > 1e5);

        prop_assert!(poly.signed_area() > 0.0);
        let centroid = vertices.centroid().unwrap();
        prop_assert!(gravity_at(centroid.x, &poly, DENSITY) > 0.0);
    }
}
