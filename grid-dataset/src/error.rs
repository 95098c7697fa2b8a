//! Error taxonomy of the dataset pipelines.
//!
//! Validation and I/O failures are scoped to one image or detection and are
//! skipped by the batch loops. Schema and configuration failures abort the run.

use std::path::PathBuf;
use thiserror::Error;

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("validation failed for '{subject}': {reason}")]
    Validation { subject: String, reason: String },
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to read image '{}': {reason}", path.display())]
    Image { path: PathBuf, reason: String },
    #[error("OpenCV error: {0}")]
    OpenCv(#[from] opencv::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error(
        "schema mismatch for image '{image}' cell {cell}: expect {expected} feature values, but get {found}"
    )]
    Schema {
        image: String,
        cell: usize,
        expected: usize,
        found: usize,
    },
    #[error("configuration error: {0}")]
    Config(String),
}

impl PipelineError {
    pub fn validation(subject: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            subject: subject.into(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }

    /// Whether the error must abort the whole run instead of skipping one unit of work.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Schema { .. } | Self::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_classification() {
        assert!(PipelineError::config("missing label table").is_fatal());
        assert!(PipelineError::Schema {
            image: "a.jpg".into(),
            cell: 3,
            expected: 10,
            found: 9,
        }
        .is_fatal());
        assert!(!PipelineError::validation("a.jpg", "too small").is_fatal());
        assert!(!PipelineError::Image {
            path: "a.jpg".into(),
            reason: "empty".into(),
        }
        .is_fatal());
    }
}
