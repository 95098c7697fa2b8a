//! Batch runs over an image folder.
//!
//! Both runs isolate failures per image: recoverable errors are logged and the
//! image is skipped, fatal errors abort the run.

mod extraction;
mod labeling;

pub use extraction::*;
pub use labeling::*;

use crate::{common::*, PipelineResult};

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub images_processed: usize,
    pub images_skipped: usize,
    pub rows_written: usize,
}

impl RunSummary {
    /// Account for the result of one image, propagating fatal errors.
    fn record<T>(&mut self, image: &str, result: PipelineResult<T>) -> PipelineResult<Option<T>> {
        match result {
            Ok(value) => {
                self.images_processed += 1;
                Ok(Some(value))
            }
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                warn!("skip '{}': {}", image, err);
                self.images_skipped += 1;
                Ok(None)
            }
        }
    }
}
