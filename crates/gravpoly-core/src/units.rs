//! Physical constants and unit conversions
//!
//! All modelling happens in SI base units. Conversion to milligals is applied
//! once, at the final gravity output; distances read in kilometres are
//! converted to metres before they reach the forward model or the resampler.

/// Gravitational constant in N·m²/kg²
pub const GRAVITATIONAL_CONSTANT: f64 = 6.67e-11;

/// Factor converting m/s² to milligals
pub const SI_TO_MGAL: f64 = 1.0e5;

const METERS_PER_KILOMETER: f64 = 1000.0;

/// Gravity units per milligal (1 mGal = 10 g.u.)
const GU_PER_MGAL: f64 = 10.0;

pub fn km_to_m(km: f64) -> f64 {
    km * METERS_PER_KILOMETER
}

pub fn m_to_km(m: f64) -> f64 {
    m / METERS_PER_KILOMETER
}

pub fn gu_to_mgal(gu: f64) -> f64 {
    gu / GU_PER_MGAL
}

pub fn mgal_to_gu(mgal: f64) -> f64 {
    mgal * GU_PER_MGAL
}

/// Gravity unit used on input files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum GravityUnit {
    #[default]
    Milligal,
    GravityUnit,
}

impl GravityUnit {
    /// Convert a value in this unit to milligals
    pub fn to_mgal(&self, value: f64) -> f64 {
        match self {
            GravityUnit::Milligal => value,
            GravityUnit::GravityUnit => gu_to_mgal(value),
        }
    }
}
