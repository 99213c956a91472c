//! File formats crossing the boundary of the numerical engine
//!
//! Profiles arrive as two-column text files; inverted bodies leave as JSON
//! model files.

pub mod model_file;
pub mod profile_csv;

pub use model_file::{load_model, save_model, ModelFile, MODEL_FILE_VERSION};
pub use profile_csv::{parse_profile, read_profile, ProfileReader};
