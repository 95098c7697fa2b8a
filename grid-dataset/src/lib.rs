//! Grid cell labels and per-cell features for image classification datasets.
//!
//! The crate turns detector output into 8×8 grid occupancy labels and turns
//! normalized image cells into fixed-length feature rows. Both results are
//! stored as flat CSV tables.

mod common;
pub mod assign;
pub mod config;
pub mod error;
pub mod features;
pub mod grid;
pub mod normalize;
pub mod pipeline;
pub mod source;
pub mod table;

pub use assign::BoxToGridAssigner;
pub use config::Config;
pub use error::{PipelineError, PipelineResult};
pub use features::{CellFeatureExtractor, CellFeatureVector, CellImage, FeatureLayout};
pub use grid::GridIndexer;
pub use label::{Detection, GridLabel, GridLabelVector, NUM_CELLS};
pub use normalize::{ImageNormalizer, NormalizedImage, ResolutionPolicy};
pub use pipeline::{extract_features, label_images, RunSummary};
