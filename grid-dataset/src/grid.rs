//! Mapping between flat cell indexes and pixel rectangles.

use crate::common::*;

/// Row-major 8×8 grid over a canonical image.
///
/// Cells are `floor(W / COLS)` by `floor(H / ROWS)` pixels. Trailing pixels
/// right of `COLS * cell_w` or below `ROWS * cell_h` belong to no cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridIndexer {
    cell_size: HW<i32>,
}

impl GridIndexer {
    pub const ROWS: usize = 8;
    pub const COLS: usize = 8;

    pub fn new(canonical_size: HW<i32>) -> Self {
        Self {
            cell_size: canonical_size.tile(Self::ROWS as i32, Self::COLS as i32),
        }
    }

    pub fn num_cells(&self) -> usize {
        Self::ROWS * Self::COLS
    }

    pub fn cell_size(&self) -> HW<i32> {
        self.cell_size
    }

    pub fn cell_area(&self) -> i32 {
        self.cell_size.area()
    }

    /// The region covered by the union of all cells.
    pub fn covered_size(&self) -> HW<i32> {
        self.cell_size.repeat(Self::ROWS as i32, Self::COLS as i32)
    }

    pub fn cell_index(row: usize, col: usize) -> usize {
        debug_assert!(row < Self::ROWS && col < Self::COLS);
        row * Self::COLS + col
    }

    pub fn row_col(index: usize) -> (usize, usize) {
        debug_assert!(index < NUM_CELLS);
        (index / Self::COLS, index % Self::COLS)
    }

    pub fn cell_rect(&self, index: usize) -> TLBR<i32> {
        let (row, col) = Self::row_col(index);
        let [cell_h, cell_w] = self.cell_size.hw();
        TLBR::from_tlhw([row as i32 * cell_h, col as i32 * cell_w, cell_h, cell_w])
    }

    /// The cell rectangle as corner coordinates `(x1, y1, x2, y2)`.
    pub fn cell_xyxy(&self, index: usize) -> [i32; 4] {
        let rect = self.cell_rect(index);
        [rect.l(), rect.t(), rect.r(), rect.b()]
    }

    pub fn cells(&self) -> impl Iterator<Item = (usize, TLBR<i32>)> + '_ {
        (0..self.num_cells()).map(move |index| (index, self.cell_rect(index)))
    }
}
