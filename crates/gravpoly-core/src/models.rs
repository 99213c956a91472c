pub mod grid;
pub mod polygon;
pub mod profile;
pub mod result;
pub mod search;
pub mod vertex;

pub use grid::ObservationGrid;
pub use polygon::Polygon;
pub use profile::{Profile, ProfileSample, MIN_PROFILE_SAMPLES};
pub use result::{OptimizationResult, Termination};
pub use search::{MutationStrategy, SearchBounds};
pub use vertex::{Vertex, VertexSet, MIN_VERTICES};
