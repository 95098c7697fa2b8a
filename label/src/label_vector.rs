use crate::GridLabel;
use anyhow::{ensure, Result};
use std::{fmt, ops::Index};

/// Number of cells in the labeling grid.
pub const NUM_CELLS: usize = 64;

/// Per-cell labels of one image in row-major cell order.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct GridLabelVector {
    cells: [GridLabel; NUM_CELLS],
}

impl GridLabelVector {
    /// An all-[`GridLabel::None`] vector.
    pub fn new() -> Self {
        Self {
            cells: [GridLabel::None; NUM_CELLS],
        }
    }

    /// Parse raw integer values, checking length and domain.
    pub fn from_values(values: &[u8]) -> Result<Self> {
        ensure!(
            values.len() == NUM_CELLS,
            "expect {} grid labels, but get {}",
            NUM_CELLS,
            values.len()
        );
        let mut cells = [GridLabel::None; NUM_CELLS];
        for (cell, &value) in cells.iter_mut().zip(values) {
            *cell = GridLabel::try_from(value)?;
        }
        Ok(Self { cells })
    }

    pub fn get(&self, index: usize) -> GridLabel {
        self.cells[index]
    }

    /// Set the label of a cell only if it is still unlabeled.
    ///
    /// Returns `true` if the cell was written.
    pub fn set_if_empty(&mut self, index: usize, label: GridLabel) -> bool {
        let cell = &mut self.cells[index];
        if cell.is_none() {
            *cell = label;
            !label.is_none()
        } else {
            false
        }
    }

    pub fn set(&mut self, index: usize, label: GridLabel) {
        self.cells[index] = label;
    }

    pub fn iter(&self) -> impl Iterator<Item = GridLabel> + '_ {
        self.cells.iter().copied()
    }

    pub fn values(&self) -> [u8; NUM_CELLS] {
        let mut values = [0; NUM_CELLS];
        values
            .iter_mut()
            .zip(self.cells.iter())
            .for_each(|(value, cell)| *value = cell.value());
        values
    }

    pub fn count(&self, label: GridLabel) -> usize {
        self.cells.iter().filter(|&&cell| cell == label).count()
    }

    /// Indexes of the cells carrying a label other than `None`.
    pub fn occupied(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| !cell.is_none())
            .map(|(index, _)| index)
            .collect()
    }

    pub fn len(&self) -> usize {
        NUM_CELLS
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for GridLabelVector {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<usize> for GridLabelVector {
    type Output = GridLabel;

    fn index(&self, index: usize) -> &Self::Output {
        &self.cells[index]
    }
}

impl fmt::Debug for GridLabelVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.values().iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_if_empty_keeps_first_writer() {
        let mut vector = GridLabelVector::new();
        assert!(vector.set_if_empty(5, GridLabel::Bat));
        assert!(!vector.set_if_empty(5, GridLabel::Ball));
        assert_eq!(vector[5], GridLabel::Bat);
        assert_eq!(vector.occupied(), vec![5]);
    }

    #[test]
    fn writing_none_leaves_cell_open() {
        let mut vector = GridLabelVector::new();
        assert!(!vector.set_if_empty(0, GridLabel::None));
        assert!(vector.set_if_empty(0, GridLabel::Stump));
        assert_eq!(vector.get(0), GridLabel::Stump);
    }

    #[test]
    fn from_values_checks_length_and_domain() {
        assert!(GridLabelVector::from_values(&[0; 63]).is_err());

        let mut values = [0u8; NUM_CELLS];
        values[10] = 4;
        assert!(GridLabelVector::from_values(&values).is_err());

        values[10] = 3;
        let vector = GridLabelVector::from_values(&values).unwrap();
        assert_eq!(vector.values(), values);
        assert_eq!(vector.count(GridLabel::Stump), 1);
        assert_eq!(vector.count(GridLabel::None), 63);
    }
}
