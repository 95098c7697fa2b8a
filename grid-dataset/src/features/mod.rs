//! Per-cell feature extraction.

mod color;
mod hog;
mod layout;
mod shape;
mod texture;

pub use color::*;
pub use hog::*;
pub use layout::*;
pub use shape::*;
pub use texture::*;

use crate::{common::*, config::FeatureConfig, PipelineResult};

/// The pixels of one grid cell in RGB and grayscale.
///
/// Both planes are continuous copies so their pixel buffers can be borrowed
/// directly.
#[derive(Debug)]
pub struct CellImage {
    rgb: Mat,
    gray: Mat,
    size: HW<i32>,
}

impl CellImage {
    /// Copy the region `rect` out of full-size RGB and grayscale images.
    pub fn crop(rgb: &Mat, gray: &Mat, rect: &TLBR<i32>) -> PipelineResult<Self> {
        let roi: core_cv::Rect = rect.into();
        Ok(Self {
            rgb: copy_region(rgb, roi)?,
            gray: copy_region(gray, roi)?,
            size: HW::from_hw(rect.hw()),
        })
    }

    /// Build a cell from a whole RGB image.
    pub fn from_rgb(rgb: &Mat) -> PipelineResult<Self> {
        let mut owned = Mat::default();
        rgb.copy_to(&mut owned)?;
        let mut gray = Mat::default();
        imgproc::cvt_color(&owned, &mut gray, imgproc::COLOR_RGB2GRAY, 0)?;
        let size = crate::normalize::mat_size(&owned)?;

        Ok(Self {
            rgb: owned,
            gray,
            size,
        })
    }

    pub fn size(&self) -> HW<i32> {
        self.size
    }

    pub fn rgb(&self) -> &Mat {
        &self.rgb
    }

    pub fn gray(&self) -> &Mat {
        &self.gray
    }

    fn gray_pixels(&self) -> PipelineResult<&[u8]> {
        Ok(self.gray.data_typed::<u8>()?)
    }

    fn rgb_pixels(&self) -> PipelineResult<Vec<[u8; 3]>> {
        let pixels = self.rgb.data_typed::<core_cv::Vec3b>()?;
        Ok(pixels.iter().map(|pixel| pixel.0).collect())
    }
}

fn copy_region(image: &Mat, roi: core_cv::Rect) -> PipelineResult<Mat> {
    let view = Mat::roi(image, roi)?;
    let mut owned = Mat::default();
    view.copy_to(&mut owned)?;
    Ok(owned)
}

/// The feature values of one cell, in [`FeatureLayout`] column order.
#[derive(Debug, Clone, PartialEq)]
pub struct CellFeatureVector(Vec<f64>);

impl CellFeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Computes the concatenated HOG, colour, texture and shape features of a cell.
#[derive(Debug)]
pub struct CellFeatureExtractor {
    config: FeatureConfig,
    hog: HogDescriptor,
    color: ColorHistogram,
    texture: TextureFilter,
    shape: ShapeCounter,
}

impl CellFeatureExtractor {
    pub fn new(config: &FeatureConfig) -> PipelineResult<Self> {
        Ok(Self {
            config: config.clone(),
            hog: HogDescriptor::new(&config.hog),
            color: ColorHistogram::new(&config.color),
            texture: TextureFilter::new(&config.texture)?,
            shape: ShapeCounter::new(&config.shape),
        })
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    pub fn layout(&self, cell_size: HW<i32>) -> FeatureLayout {
        let numbered = |prefix: &str, len: usize| -> Vec<String> {
            (0..len).map(|index| format!("{}_{}", prefix, index)).collect()
        };

        FeatureLayout::new(vec![
            FeatureGroup {
                kind: FeatureGroupKind::Hog,
                columns: numbered("HOG", self.hog.len(cell_size)),
            },
            FeatureGroup {
                kind: FeatureGroupKind::Color,
                columns: numbered("Color", self.color.len()),
            },
            FeatureGroup {
                kind: FeatureGroupKind::Texture,
                columns: self.texture.column_names(),
            },
            FeatureGroup {
                kind: FeatureGroupKind::Shape,
                columns: SHAPE_COLUMNS.iter().map(|name| name.to_string()).collect(),
            },
        ])
    }

    pub fn extract(&self, cell: &CellImage) -> PipelineResult<CellFeatureVector> {
        let size = cell.size();
        let hog = self.hog.compute(cell.gray_pixels()?, size);
        let color = self.color.compute(&cell.rgb_pixels()?);
        let texture = self.texture.compute(cell)?;
        let ShapeCounts { lines, circles } = self.shape.count(cell.gray())?;

        let mut values = hog;
        values.extend(color);
        values.extend(texture);
        values.extend([lines as f64, circles as f64]);
        Ok(CellFeatureVector(values))
    }
}

/// Histogram of 8-bit values over `bins` equal-width bins, normalized to sum to one.
pub(crate) fn normalized_histogram(values: impl Iterator<Item = u8>, bins: usize) -> Vec<f64> {
    let mut counts = vec![0usize; bins];
    let mut total = 0usize;
    values.for_each(|value| {
        counts[value as usize * bins / 256] += 1;
        total += 1;
    });

    if total == 0 {
        return vec![0.0; bins];
    }
    counts
        .into_iter()
        .map(|count| count as f64 / total as f64)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FeaturePreset, TextureSummary};
    use approx::assert_abs_diff_eq;

    fn gradient_rgb(h: i32, w: i32) -> Mat {
        let mut image =
            Mat::new_rows_cols_with_default(h, w, core_cv::CV_8UC3, Scalar::all(0.0)).unwrap();
        for y in 0..h {
            for x in 0..w {
                let pixel = image.at_2d_mut::<core_cv::Vec3b>(y, x).unwrap();
                pixel.0 = [(x * 2) as u8, (y * 3) as u8, ((x + y) % 256) as u8];
            }
        }
        image
    }

    #[test]
    fn standard_layout_for_canonical_cell() {
        let extractor =
            CellFeatureExtractor::new(&FeatureConfig::preset(FeaturePreset::Standard)).unwrap();
        let layout = extractor.layout(HW::from_hw([75, 100]));

        assert_eq!(layout.group_len(FeatureGroupKind::Hog), 3168);
        assert_eq!(layout.group_len(FeatureGroupKind::Color), 96);
        assert_eq!(layout.group_len(FeatureGroupKind::Texture), 48);
        assert_eq!(layout.group_len(FeatureGroupKind::Shape), 2);
        assert_eq!(layout.len(), 3168 + 96 + 48 + 2);

        let header = layout.header();
        assert_eq!(header[3], "HOG_0");
        assert_eq!(header[3 + 3168], "Color_0");
        assert_eq!(header[3 + 3168 + 96], "Conv_0");
        assert_eq!(header[header.len() - 2], "Shape_Lines");
        assert_eq!(header[header.len() - 1], "Shape_Circles");
    }

    #[test]
    fn compact_layout_uses_texture_statistics() {
        let extractor =
            CellFeatureExtractor::new(&FeatureConfig::preset(FeaturePreset::Compact)).unwrap();
        let layout = extractor.layout(HW::from_hw([75, 100]));
        assert_eq!(extractor.config().texture, TextureSummary::MeanVariance);
        assert_eq!(layout.group_len(FeatureGroupKind::Hog), 540);
        assert_eq!(layout.group_len(FeatureGroupKind::Color), 24);
        assert!(layout.header().iter().any(|name| name == "Conv_Blur_Var"));
    }

    #[test]
    fn extracted_vector_matches_layout_and_is_deterministic() {
        for preset in [FeaturePreset::Standard, FeaturePreset::Compact] {
            let extractor = CellFeatureExtractor::new(&FeatureConfig::preset(preset)).unwrap();
            let cell = CellImage::from_rgb(&gradient_rgb(75, 100)).unwrap();

            let first = extractor.extract(&cell).unwrap();
            let second = extractor.extract(&cell).unwrap();
            assert_eq!(first.len(), extractor.layout(cell.size()).len());
            assert_eq!(first, second);
            assert!(first.values().iter().all(|value| value.is_finite()));
        }
    }

    #[test]
    fn crop_copies_the_cell_region() {
        let rgb = gradient_rgb(150, 200);
        let mut gray = Mat::default();
        imgproc::cvt_color(&rgb, &mut gray, imgproc::COLOR_RGB2GRAY, 0).unwrap();

        let rect = TLBR::from_tlhw([75, 100, 75, 100]);
        let cell = CellImage::crop(&rgb, &gray, &rect).unwrap();
        assert_eq!(cell.size(), HW::from_hw([75, 100]));
        assert_eq!(cell.gray_pixels().unwrap().len(), 7500);
        assert_eq!(
            cell.rgb().at_2d::<core_cv::Vec3b>(0, 0).unwrap().0,
            rgb.at_2d::<core_cv::Vec3b>(75, 100).unwrap().0
        );
    }

    #[test]
    fn histogram_of_empty_input_is_zero() {
        assert_eq!(normalized_histogram(std::iter::empty(), 4), vec![0.0; 4]);
        let values = normalized_histogram([0u8, 255].into_iter(), 2);
        assert_abs_diff_eq!(values[0], 0.5);
        assert_abs_diff_eq!(values[1], 0.5);
    }
}
