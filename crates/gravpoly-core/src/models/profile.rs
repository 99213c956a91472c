use serde::Serialize;

use crate::error::{GravpolyError, Result};
use crate::units::{km_to_m, m_to_km};

/// Minimum number of samples for a stable curve fit
pub const MIN_PROFILE_SAMPLES: usize = 4;

/// One field measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfileSample {
    /// Distance along the profile in metres
    pub distance: f64,
    /// Measured gravity in mGal
    pub gravity: f64,
}

/// Validated gravity profile: distances strictly increasing, in metres
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    name: Option<String>,
    samples: Vec<ProfileSample>,
}

impl Profile {
    /// Create a profile from samples already in metres / mGal
    pub fn new(samples: Vec<ProfileSample>) -> Result<Self> {
        validate_samples(&samples)?;
        Ok(Self { name: None, samples })
    }

    /// Create a profile from `(distance km, gravity mGal)` pairs, the layout of
    /// field files
    pub fn from_km_mgal(pairs: &[(f64, f64)]) -> Result<Self> {
        let samples = pairs
            .iter()
            .map(|&(km, mgal)| ProfileSample { distance: km_to_m(km), gravity: mgal })
            .collect();
        Self::new(samples)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn samples(&self) -> &[ProfileSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Distances in metres
    pub fn distances(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.distance).collect()
    }

    /// Gravity values in mGal
    pub fn gravity(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.gravity).collect()
    }

    /// First and last distance in metres
    pub fn span(&self) -> (f64, f64) {
        (self.samples[0].distance, self.samples[self.samples.len() - 1].distance)
    }

    /// Back to the `(km, mGal)` file layout
    pub fn to_km_mgal(&self) -> Vec<(f64, f64)> {
        self.samples.iter().map(|s| (m_to_km(s.distance), s.gravity)).collect()
    }
}

fn validate_samples(samples: &[ProfileSample]) -> Result<()> {
    if samples.is_empty() {
        return Err(GravpolyError::EmptyInput { what: "profile".to_string() });
    }

    for (index, sample) in samples.iter().enumerate() {
        if !sample.distance.is_finite() {
            return Err(GravpolyError::NonFiniteValue { what: "distance".to_string(), index });
        }
        if !sample.gravity.is_finite() {
            return Err(GravpolyError::NonFiniteValue { what: "gravity".to_string(), index });
        }
    }

    if samples.len() < MIN_PROFILE_SAMPLES {
        return Err(GravpolyError::ProfileTooShort {
            found: samples.len(),
            required: MIN_PROFILE_SAMPLES,
        });
    }

    for (index, pair) in samples.windows(2).enumerate() {
        if pair[1].distance <= pair[0].distance {
            return Err(GravpolyError::NonMonotonicDistance {
                index: index + 1,
                previous: pair[0].distance,
                current: pair[1].distance,
            });
        }
    }

    Ok(())
}
