//! Gravpoly Inversion - Polygon shape inversion
//!
//! Searches the bounded vertex-coordinate space for the polygon whose
//! Talwani response best matches a resampled gravity profile, using
//! differential evolution with the misfit objective as the cost function.

pub mod engine;
pub mod evolution;
pub mod misfit;

pub use engine::{InversionEngine, InversionPhase, InversionProgress, InversionSettings, StopSignal};
pub use evolution::{CostFunction, DifferentialEvolution, EvolutionConfig};
pub use misfit::{misfit, MisfitObjective};
