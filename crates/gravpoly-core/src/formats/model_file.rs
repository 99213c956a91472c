//! JSON model files
//!
//! A model file stores everything needed to redraw an inverted body and its
//! fit: vertices, closed polygon, observation grid, modelled and observed
//! curves, misfit and run metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{GravpolyError, Result};
use crate::models::result::OptimizationResult;

/// Current on-disk layout version
pub const MODEL_FILE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelFile {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    /// Density contrast used for the run, kg/m³
    pub density: f64,
    pub profile_name: Option<String>,
    #[serde(flatten)]
    pub result: OptimizationResult,
}

impl ModelFile {
    pub fn new(result: OptimizationResult, density: f64, profile_name: Option<String>) -> Self {
        Self {
            version: MODEL_FILE_VERSION,
            created_at: Utc::now(),
            density,
            profile_name,
            result,
        }
    }
}

/// Write a model file as pretty-printed JSON
pub fn save_model<P: AsRef<Path>>(path: P, model: &ModelFile) -> Result<()> {
    let json = serde_json::to_string_pretty(model)?;
    fs::write(path.as_ref(), json)?;
    tracing::debug!("Saved model to {}", path.as_ref().display());
    Ok(())
}

/// Read a model file, rejecting unknown layout versions
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<ModelFile> {
    let content = fs::read_to_string(path.as_ref())?;
    let model: ModelFile = serde_json::from_str(&content)?;

    if model.version != MODEL_FILE_VERSION {
        return Err(GravpolyError::Serialization(format!(
            "Unsupported model file version {} (expected {})",
            model.version, MODEL_FILE_VERSION
        )));
    }

    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ObservationGrid, Polygon, Termination, VertexSet};
    use tempfile::TempDir;

    fn model() -> ModelFile {
        let vertices = VertexSet::from_pairs(&[(2000.0, 0.0), (6000.0, 0.0), (4000.0, 3000.0)]);
        let result = OptimizationResult {
            polygon: Polygon::close(vertices.as_slice().to_vec()),
            vertices,
            grid: ObservationGrid::linspace(0.0, 10_000.0, 5).unwrap(),
            modeled: vec![2.1, 9.2, 24.1, 9.2, 2.1],
            observed: vec![2.0, 9.0, 24.0, 9.5, 2.2],
            misfit: 0.9,
            generations: 120,
            evaluations: 10_890,
            termination: Termination::Converged,
        };
        ModelFile::new(result, 450.0, Some("synthetic".to_string()))
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.json");

        let original = model();
        save_model(&path, &original).unwrap();
        let loaded = load_model(&path).unwrap();

        assert_eq!(loaded, original);
        assert_eq!(loaded.result.polygon.ring().len(), 4);
    }

    #[test]
    fn test_rejects_unknown_version() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.json");

        let mut future = model();
        future.version = 99;
        save_model(&path, &future).unwrap();

        assert!(matches!(load_model(&path), Err(GravpolyError::Serialization(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(load_model(dir.path().join("nope.json")), Err(GravpolyError::Io(_))));
    }
}
