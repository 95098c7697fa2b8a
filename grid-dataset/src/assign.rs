//! Conversion of detector boxes into grid labels.

use crate::{common::*, grid::GridIndexer};

/// Assigns the classes of detections to the grid cells they cover.
///
/// A cell takes the class of a detection when the intersection exceeds
/// `overlap_threshold` of the cell area. Detections are visited in the given
/// order and the first detection that labels a cell keeps it, regardless of
/// the overlap or confidence of later detections.
#[derive(Debug, Clone)]
pub struct BoxToGridAssigner {
    grid: GridIndexer,
    overlap_threshold: R64,
}

impl BoxToGridAssigner {
    pub fn new(grid: GridIndexer, overlap_threshold: R64) -> Self {
        Self {
            grid,
            overlap_threshold,
        }
    }

    pub fn grid(&self) -> &GridIndexer {
        &self.grid
    }

    pub fn assign(&self, detections: &[Detection]) -> GridLabelVector {
        let mut labels = GridLabelVector::new();
        let cell_area = self.grid.cell_area() as f64;

        for (det_index, detection) in detections.iter().enumerate() {
            let label = match detection.to_label() {
                Some(label) => label,
                None => {
                    warn!(
                        "ignore malformed detection #{} with box {:?}",
                        det_index, detection.xyxy
                    );
                    continue;
                }
            };

            for (cell_index, cell_rect) in self.grid.cells() {
                let cell_rect: TLBR<f64> = cell_rect.cast();
                let ratio = label.rect.intersection_area_with(&cell_rect) / cell_area;

                if ratio > self.overlap_threshold.raw() {
                    labels.set_if_empty(cell_index, label.class);
                }
            }
        }

        labels
    }
}
