//! Error types for gravpoly

use thiserror::Error;

/// Broad category of a [`GravpolyError`]
///
/// Both `DataValidity` and `Configuration` errors are raised before any
/// modelling or optimisation work starts and are never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    DataValidity,
    Configuration,
    Io,
    Serialization,
}

#[derive(Debug, Error)]
pub enum GravpolyError {
    // Data validity errors
    #[error("Empty input: {what}")]
    EmptyInput { what: String },

    #[error("Profile has {found} samples, at least {required} are required for curve fitting")]
    ProfileTooShort { found: usize, required: usize },

    #[error(
        "Distances must be strictly increasing: sample {index} is at {current} m after {previous} m"
    )]
    NonMonotonicDistance {
        index: usize,
        previous: f64,
        current: f64,
    },

    #[error("Non-finite {what} at index {index}")]
    NonFiniteValue { what: String, index: usize },

    #[error("Failed to parse profile at line {line}: {reason}")]
    ProfileParse { line: usize, reason: String },

    #[error("Invalid observation grid: {reason}")]
    GridInvalid { reason: String },

    #[error("Vertex {index} lies above the observation surface (z = {z} m, depth must be >= 0)")]
    VertexAboveSurface { index: usize, z: f64 },

    // Configuration errors
    #[error("At least 3 vertices are required to form a polygon, got {found}")]
    TooFewVertices { found: usize },

    #[error("Invalid search bounds at coordinate {index}: min {min} is greater than max {max}")]
    InvalidBounds { index: usize, min: f64, max: f64 },

    #[error("Search bounds cover {found} coordinates, expected {expected}")]
    BoundsLengthMismatch { expected: usize, found: usize },

    #[error("Density contrast must be positive and finite, got {value} kg/m^3")]
    InvalidDensity { value: f64 },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl GravpolyError {
    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            GravpolyError::EmptyInput { .. }
            | GravpolyError::ProfileTooShort { .. }
            | GravpolyError::NonMonotonicDistance { .. }
            | GravpolyError::NonFiniteValue { .. }
            | GravpolyError::ProfileParse { .. }
            | GravpolyError::GridInvalid { .. }
            | GravpolyError::VertexAboveSurface { .. } => ErrorKind::DataValidity,
            GravpolyError::TooFewVertices { .. }
            | GravpolyError::InvalidBounds { .. }
            | GravpolyError::BoundsLengthMismatch { .. }
            | GravpolyError::InvalidDensity { .. }
            | GravpolyError::ConfigInvalid { .. } => ErrorKind::Configuration,
            GravpolyError::Io(_) => ErrorKind::Io,
            GravpolyError::Serialization(_) => ErrorKind::Serialization,
        }
    }

    pub fn is_data_validity(&self) -> bool {
        self.kind() == ErrorKind::DataValidity
    }

    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }
}

impl From<serde_json::Error> for GravpolyError {
    fn from(err: serde_json::Error) -> Self {
        GravpolyError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GravpolyError>;
