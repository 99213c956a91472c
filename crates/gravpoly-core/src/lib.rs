//! Gravpoly Core - Domain models, errors, units and configuration
//!
//! This crate holds the data model shared by the forward-modelling and
//! inversion crates: observation grids, field profiles, vertex sets and
//! polygons, search bounds and optimisation results, plus the layered
//! configuration and the file formats used to move them across the
//! boundary of the numerical engine.

pub mod config;
pub mod error;
pub mod formats;
pub mod models;
pub mod units;

pub use error::{ErrorKind, GravpolyError, Result};
