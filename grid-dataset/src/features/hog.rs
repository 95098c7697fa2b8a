use crate::{common::*, config::HogConfig};

const L2_HYS_CLIP: f64 = 0.2;
const L2_HYS_EPS: f64 = 1e-5;

/// Histogram of oriented gradients over one grayscale cell.
///
/// Gradients are centred differences with zero gradient on the one-pixel
/// border. Orientations are unsigned in `[0, 180)`. Each sub-cell histogram
/// accumulates gradient magnitudes and is averaged over the sub-cell area.
/// Overlapping blocks move by one sub-cell and are L2-Hys normalized. The
/// output is ordered by block row, block column, sub-cell row, sub-cell
/// column and orientation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HogDescriptor {
    orientations: usize,
    pixels_per_cell: [usize; 2],
    cells_per_block: [usize; 2],
}

impl HogDescriptor {
    pub fn new(config: &HogConfig) -> Self {
        let HogConfig {
            orientations,
            pixels_per_cell,
            cells_per_block,
        } = *config;
        Self {
            orientations,
            pixels_per_cell,
            cells_per_block,
        }
    }

    /// Number of sub-cells as `[rows, cols]` for an image of `size`.
    fn num_cells(&self, size: HW<i32>) -> [usize; 2] {
        let [ppc_h, ppc_w] = self.pixels_per_cell;
        [size.h() as usize / ppc_h, size.w() as usize / ppc_w]
    }

    /// Number of blocks as `[rows, cols]` for an image of `size`.
    pub fn num_blocks(&self, size: HW<i32>) -> [usize; 2] {
        let [cells_h, cells_w] = self.num_cells(size);
        let [cpb_h, cpb_w] = self.cells_per_block;
        [
            (cells_h + 1).saturating_sub(cpb_h),
            (cells_w + 1).saturating_sub(cpb_w),
        ]
    }

    pub fn len(&self, size: HW<i32>) -> usize {
        let [blocks_h, blocks_w] = self.num_blocks(size);
        let [cpb_h, cpb_w] = self.cells_per_block;
        blocks_h * blocks_w * cpb_h * cpb_w * self.orientations
    }

    /// Compute the descriptor of row-major grayscale `pixels` with the given size.
    pub fn compute(&self, pixels: &[u8], size: HW<i32>) -> Vec<f64> {
        let h = size.h() as usize;
        let w = size.w() as usize;
        debug_assert_eq!(pixels.len(), h * w);

        let histograms = self.cell_histograms(pixels, h, w);
        self.normalize_blocks(&histograms, size)
    }

    fn cell_histograms(&self, pixels: &[u8], h: usize, w: usize) -> Vec<f64> {
        let [ppc_h, ppc_w] = self.pixels_per_cell;
        let [cells_h, cells_w] = self.num_cells(HW::from_hw([h as i32, w as i32]));
        let n_bins = self.orientations;
        let bin_width = 180.0 / n_bins as f64;
        let at = |y: usize, x: usize| pixels[y * w + x] as f64;

        let mut histograms = vec![0.0; cells_h * cells_w * n_bins];

        for y in 0..(cells_h * ppc_h) {
            for x in 0..(cells_w * ppc_w) {
                let g_row = if y == 0 || y + 1 == h {
                    0.0
                } else {
                    at(y + 1, x) - at(y - 1, x)
                };
                let g_col = if x == 0 || x + 1 == w {
                    0.0
                } else {
                    at(y, x + 1) - at(y, x - 1)
                };

                let magnitude = g_row.hypot(g_col);
                if magnitude == 0.0 {
                    continue;
                }

                let orientation = g_row.atan2(g_col).to_degrees().rem_euclid(180.0);
                let bin = ((orientation / bin_width) as usize).min(n_bins - 1);
                let cell = (y / ppc_h) * cells_w + x / ppc_w;
                histograms[cell * n_bins + bin] += magnitude;
            }
        }

        let area = (ppc_h * ppc_w) as f64;
        histograms.iter_mut().for_each(|value| *value /= area);
        histograms
    }

    fn normalize_blocks(&self, histograms: &[f64], size: HW<i32>) -> Vec<f64> {
        let [_, cells_w] = self.num_cells(size);
        let [blocks_h, blocks_w] = self.num_blocks(size);
        let [cpb_h, cpb_w] = self.cells_per_block;
        let n_bins = self.orientations;

        let mut output = Vec::with_capacity(self.len(size));
        let mut block = Vec::with_capacity(cpb_h * cpb_w * n_bins);

        for block_row in 0..blocks_h {
            for block_col in 0..blocks_w {
                block.clear();
                for cell_row in block_row..(block_row + cpb_h) {
                    let begin = (cell_row * cells_w + block_col) * n_bins;
                    let end = begin + cpb_w * n_bins;
                    block.extend_from_slice(&histograms[begin..end]);
                }
                l2_hys(&mut block);
                output.extend_from_slice(&block);
            }
        }

        output
    }
}

fn l2_hys(block: &mut [f64]) {
    let scale = |block: &[f64]| {
        let sum_sq: f64 = block.iter().map(|value| value * value).sum();
        (sum_sq + L2_HYS_EPS * L2_HYS_EPS).sqrt()
    };

    let norm = scale(block);
    block
        .iter_mut()
        .for_each(|value| *value = (*value / norm).min(L2_HYS_CLIP));

    let norm = scale(block);
    block.iter_mut().for_each(|value| *value /= norm);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn descriptor(ppc: usize) -> HogDescriptor {
        HogDescriptor::new(&HogConfig {
            orientations: 9,
            pixels_per_cell: [ppc, ppc],
            cells_per_block: [2, 2],
        })
    }

    #[test]
    fn descriptor_length_for_canonical_cell() {
        let cell = HW::from_hw([75, 100]);
        // 9 x 12 sub-cells, 8 x 11 blocks
        assert_eq!(descriptor(8).num_blocks(cell), [8, 11]);
        assert_eq!(descriptor(8).len(cell), 3168);
        // 4 x 6 sub-cells, 3 x 5 blocks
        assert_eq!(descriptor(16).len(cell), 540);
    }

    #[test]
    fn computed_length_matches_declared_length() {
        let size = HW::from_hw([75, 100]);
        let pixels: Vec<u8> = (0..75 * 100).map(|i| (i * 7 % 251) as u8).collect();
        for ppc in [8, 16] {
            let hog = descriptor(ppc);
            assert_eq!(hog.compute(&pixels, size).len(), hog.len(size));
        }
    }

    #[test]
    fn flat_image_has_zero_descriptor() {
        let size = HW::from_hw([32, 32]);
        let values = descriptor(8).compute(&[128; 32 * 32], size);
        assert!(values.iter().all(|&value| value == 0.0));
    }

    #[test]
    fn vertical_edge_votes_horizontal_gradient_bin() {
        // left half dark, right half bright: gradients point along +x, orientation 0
        let size = HW::from_hw([16, 16]);
        let pixels: Vec<u8> = (0..16 * 16)
            .map(|i| if i % 16 < 8 { 0 } else { 200 })
            .collect();
        let values = descriptor(8).compute(&pixels, size);
        assert_eq!(values.len(), 36);

        // a single block; the edge runs through both columns of sub-cells
        let bin0: f64 = values.iter().step_by(9).sum();
        let others: f64 = values
            .iter()
            .enumerate()
            .filter(|(index, _)| index % 9 != 0)
            .map(|(_, value)| value)
            .sum();
        assert!(bin0 > 0.0);
        assert_abs_diff_eq!(others, 0.0);
    }

    #[test]
    fn blocks_are_l2_hys_normalized() {
        let size = HW::from_hw([24, 24]);
        let pixels: Vec<u8> = (0..24 * 24).map(|i| ((i * 37) % 256) as u8).collect();
        let values = descriptor(8).compute(&pixels, size);

        for block in values.chunks(36) {
            let norm: f64 = block.iter().map(|v| v * v).sum::<f64>().sqrt();
            assert_abs_diff_eq!(norm, 1.0, epsilon = 1e-6);
        }
    }
}
