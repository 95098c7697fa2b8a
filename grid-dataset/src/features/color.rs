use super::normalized_histogram;
use crate::config::ColorConfig;

/// Per-channel intensity histograms of an RGB cell.
///
/// The channels are emitted in R, G, B order. Each channel histogram sums to
/// one so that the values do not depend on the cell area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorHistogram {
    bins: usize,
}

impl ColorHistogram {
    pub fn new(config: &ColorConfig) -> Self {
        Self { bins: config.bins }
    }

    pub fn len(&self) -> usize {
        3 * self.bins
    }

    pub fn compute(&self, pixels: &[[u8; 3]]) -> Vec<f64> {
        (0..3)
            .flat_map(|channel| {
                normalized_histogram(pixels.iter().map(|pixel| pixel[channel]), self.bins)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn channels_are_normalized_independently() {
        let hist = ColorHistogram::new(&ColorConfig { bins: 4 });
        let pixels = [[0, 128, 255], [0, 130, 255], [63, 255, 255], [64, 0, 255]];
        let values = hist.compute(&pixels);
        assert_eq!(values.len(), hist.len());

        let (red, rest) = values.split_at(4);
        let (green, blue) = rest.split_at(4);
        assert_eq!(red, &[0.75, 0.25, 0.0, 0.0]);
        assert_eq!(green, &[0.25, 0.0, 0.5, 0.25]);
        assert_eq!(blue, &[0.0, 0.0, 0.0, 1.0]);

        for channel in values.chunks(4) {
            assert_abs_diff_eq!(channel.iter().sum::<f64>(), 1.0);
        }
    }
}
