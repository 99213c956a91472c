use serde::{Deserialize, Serialize};

use crate::error::{GravpolyError, Result};
use crate::models::profile::Profile;
use crate::models::vertex::MIN_VERTICES;

/// Feasible region of the inversion: one `(min, max)` pair per coordinate,
/// interleaved as `[x0, z0, x1, z1, ...]` like the candidate vectors.
///
/// Depth limits never reach above the observation surface (`z >= 0`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(f64, f64)>", into = "Vec<(f64, f64)>")]
pub struct SearchBounds {
    pairs: Vec<(f64, f64)>,
}

impl SearchBounds {
    pub fn new(pairs: Vec<(f64, f64)>) -> Result<Self> {
        if pairs.len() % 2 != 0 {
            return Err(GravpolyError::BoundsLengthMismatch {
                expected: pairs.len() + 1,
                found: pairs.len(),
            });
        }

        let n_vertices = pairs.len() / 2;
        if n_vertices < MIN_VERTICES {
            return Err(GravpolyError::TooFewVertices { found: n_vertices });
        }

        for (index, &(min, max)) in pairs.iter().enumerate() {
            if !min.is_finite() || !max.is_finite() {
                return Err(GravpolyError::ConfigInvalid {
                    key: "bounds".to_string(),
                    reason: format!("coordinate {} has a non-finite limit", index),
                });
            }
            if min > max {
                return Err(GravpolyError::InvalidBounds { index, min, max });
            }
            if index % 2 == 1 && min < 0.0 {
                return Err(GravpolyError::ConfigInvalid {
                    key: "bounds".to_string(),
                    reason: format!(
                        "depth limit of coordinate {} starts above the surface at {} m",
                        index, min
                    ),
                });
            }
        }

        Ok(Self { pairs })
    }

    /// Same x and z range for every vertex
    pub fn uniform(n_vertices: usize, x: (f64, f64), z: (f64, f64)) -> Result<Self> {
        if n_vertices < MIN_VERTICES {
            return Err(GravpolyError::TooFewVertices { found: n_vertices });
        }
        let pairs = std::iter::repeat([x, z]).take(n_vertices).flatten().collect();
        Self::new(pairs)
    }

    /// x limited to the profile's extent, z from the surface to `max_depth`
    pub fn for_profile(profile: &Profile, n_vertices: usize, max_depth: f64) -> Result<Self> {
        if !max_depth.is_finite() || max_depth <= 0.0 {
            return Err(GravpolyError::ConfigInvalid {
                key: "max_depth".to_string(),
                reason: format!("must be positive, got {}", max_depth),
            });
        }
        Self::uniform(n_vertices, profile.span(), (0.0, max_depth))
    }

    pub fn pairs(&self) -> &[(f64, f64)] {
        &self.pairs
    }

    /// Length of a candidate vector
    pub fn dimensions(&self) -> usize {
        self.pairs.len()
    }

    pub fn n_vertices(&self) -> usize {
        self.pairs.len() / 2
    }

    pub fn lower(&self, index: usize) -> f64 {
        self.pairs[index].0
    }

    pub fn upper(&self, index: usize) -> f64 {
        self.pairs[index].1
    }

    /// Clamp a coordinate into its range
    pub fn clip(&self, index: usize, value: f64) -> f64 {
        let (min, max) = self.pairs[index];
        value.clamp(min, max)
    }

    pub fn contains(&self, candidate: &[f64]) -> bool {
        candidate.len() == self.pairs.len()
            && candidate.iter().zip(&self.pairs).all(|(v, &(min, max))| *v >= min && *v <= max)
    }
}

impl TryFrom<Vec<(f64, f64)>> for SearchBounds {
    type Error = GravpolyError;

    fn try_from(pairs: Vec<(f64, f64)>) -> Result<Self> {
        Self::new(pairs)
    }
}

impl From<SearchBounds> for Vec<(f64, f64)> {
    fn from(bounds: SearchBounds) -> Self {
        bounds.pairs
    }
}

/// Differential-evolution mutation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MutationStrategy {
    /// Mutate around the best member of the population
    #[default]
    Best1Bin,
    /// Mutate around a random member of the population
    Rand1Bin,
}

impl MutationStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationStrategy::Best1Bin => "best1bin",
            MutationStrategy::Rand1Bin => "rand1bin",
        }
    }
}
