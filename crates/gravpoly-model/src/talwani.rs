//! Talwani line-integral forward model
//!
//! Vertical gravity anomaly of a 2-D body with a polygonal cross-section
//! (Talwani, Worzel & Landisman, 1959), observed at the surface `z = 0`.
//! Coordinates are metres with `z` positive downward, density is kg/m³ and
//! the result is in mGal.
//!
//! The closed-form edge term has removable singularities when an endpoint
//! sits directly below the observation point, when an edge is vertical or
//! horizontal, or when an endpoint lies on the 45° diagonal through the
//! observation point. Those coordinates are moved by [`NUDGE`] before the
//! trigonometric terms are evaluated. The nudges are applied in a fixed
//! order, so results are reproducible, at the cost of a small bias near the
//! singular geometries.

use gravpoly_core::models::{ObservationGrid, Polygon, Vertex};
use gravpoly_core::units::{GRAVITATIONAL_CONSTANT, SI_TO_MGAL};
use std::f64::consts::PI;

/// Offset applied to singular coordinates, metres
pub const NUDGE: f64 = 0.01;

/// Gravity of `polygon` at every grid point, mGal
pub fn gravity(grid: &ObservationGrid, polygon: &Polygon, density: f64) -> Vec<f64> {
    grid.iter().map(|xp| gravity_at(xp, polygon, density)).collect()
}

/// Gravity of `polygon` at a single surface point `xp`, mGal.
///
/// The sign follows the ring orientation: rings with positive signed area in
/// the `(x, z)` plane give positive values for a positive density.
pub fn gravity_at(xp: f64, polygon: &Polygon, density: f64) -> f64 {
    let sum: f64 = polygon.edges().map(|(v, next)| edge_term(xp, v, next)).sum();
    2.0 * GRAVITATIONAL_CONSTANT * density * SI_TO_MGAL * sum
}

/// Edge endpoints relative to the observation point
#[derive(Debug, Clone, Copy, PartialEq)]
struct RelativeEdge {
    xv: f64,
    zv: f64,
    xv1: f64,
    zv1: f64,
}

impl RelativeEdge {
    fn new(xp: f64, v: Vertex, next: Vertex) -> Self {
        Self { xv: v.x - xp, zv: v.z, xv1: next.x - xp, zv1: next.z }
    }

    /// Move coordinates off the singular configurations
    fn nudged(mut self) -> Self {
        if self.xv == 0.0 {
            self.xv += NUDGE;
        }
        if self.xv == self.xv1 {
            self.xv += NUDGE;
        }
        if self.xv == self.zv {
            self.zv += NUDGE;
        }
        if self.zv == self.zv1 {
            self.zv += NUDGE;
        }
        if self.xv1 == self.zv1 {
            self.zv1 += NUDGE;
        }
        if self.xv1 == 0.0 {
            self.xv1 += NUDGE;
        }

        // Later nudges can recreate the two equalities the edge term divides by
        if self.zv == self.zv1 {
            self.zv += NUDGE;
        }
        if self.xv == self.xv1 {
            self.xv += NUDGE;
        }

        self
    }
}

/// Polar angle of `(x, z)` folded into `[0, π)`
fn polar_angle(x: f64, z: f64) -> f64 {
    let theta = z.atan2(x);
    if theta < 0.0 {
        theta + PI
    } else {
        theta
    }
}

/// Contribution of edge `(v, next)` before the `2Gρ` scaling
fn edge_term(xp: f64, v: Vertex, next: Vertex) -> f64 {
    let RelativeEdge { xv, zv, xv1, zv1 } = RelativeEdge::new(xp, v, next).nudged();

    let phi = (zv1 - zv).atan2(xv1 - xv);
    let a = xv1 + zv1 * (xv1 - xv) / (zv - zv1);

    let theta = polar_angle(xv, zv);
    let theta1 = polar_angle(xv1, zv1);

    // Edge seen edge-on from the observation point
    if theta == theta1 {
        return 0.0;
    }

    let tan_phi = phi.tan();
    let ratio = (theta.cos() * (theta.tan() - tan_phi)) / (theta1.cos() * (theta1.tan() - tan_phi));

    a * phi.sin() * phi.cos() * ((theta - theta1) + tan_phi * ratio.ln())
}
