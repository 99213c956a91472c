//! Gravpoly Model - Numerical forward engine
//!
//! This crate turns vertex sets into closed polygons, computes the vertical
//! gravity anomaly of a polygonal body with the Talwani line integral, fits
//! smoothing splines to field profiles, and estimates the sensitivity of the
//! modelled gravity to each vertex coordinate.

pub mod jacobian;
pub mod polygon;
pub mod resample;
pub mod talwani;

pub use jacobian::{vertex_jacobian, Jacobian, DEFAULT_STEP};
pub use polygon::{build_polygon, PolygonBuilder};
pub use resample::{resample, ProfileResampler, SmoothingSpline};
pub use talwani::{gravity, gravity_at};
