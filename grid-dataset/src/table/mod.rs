//! The label and feature tables and their manifests.

mod feature_table;
mod label_table;
mod manifest;

pub use feature_table::*;
pub use label_table::*;
pub use manifest::*;
