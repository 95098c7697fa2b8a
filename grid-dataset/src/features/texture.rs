use super::{normalized_histogram, CellImage};
use crate::{common::*, config::TextureSummary, PipelineResult};
use strum::{EnumIter, IntoEnumIterator, IntoStaticStr};

/// The fixed convolution kernels applied to the grayscale cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
pub enum TextureKernel {
    Edge,
    Sharpen,
    Blur,
}

impl TextureKernel {
    fn coefficients(&self) -> (i32, Vec<f32>) {
        match self {
            Self::Edge => (3, vec![-1., -1., -1., -1., 8., -1., -1., -1., -1.]),
            Self::Sharpen => (3, vec![0., -1., 0., -1., 5., -1., 0., -1., 0.]),
            Self::Blur => (5, vec![1.0 / 25.0; 25]),
        }
    }

    /// Edge and sharpen responses can leave the 8-bit range, so they are
    /// filtered in floating point and folded back by absolute value.
    fn needs_float_response(&self) -> bool {
        !matches!(self, Self::Blur)
    }

    fn kernel_mat(&self) -> PipelineResult<Mat> {
        let (size, coefficients) = self.coefficients();
        let mut kernel =
            Mat::new_rows_cols_with_default(size, size, core_cv::CV_32F, Scalar::all(0.0))?;
        for (index, value) in coefficients.into_iter().enumerate() {
            let index = index as i32;
            *kernel.at_2d_mut::<f32>(index / size, index % size)? = value;
        }
        Ok(kernel)
    }

    pub fn name(&self) -> &'static str {
        self.into()
    }
}

/// Convolution responses summarized per kernel.
#[derive(Debug)]
pub struct TextureFilter {
    kernels: Vec<(TextureKernel, Mat)>,
    summary: TextureSummary,
}

impl TextureFilter {
    pub fn new(summary: &TextureSummary) -> PipelineResult<Self> {
        let kernels: Vec<_> = TextureKernel::iter()
            .map(|kind| Ok((kind, kind.kernel_mat()?)))
            .collect::<PipelineResult<_>>()?;

        Ok(Self {
            kernels,
            summary: summary.clone(),
        })
    }

    pub fn column_names(&self) -> Vec<String> {
        match self.summary {
            TextureSummary::Histogram { bins } => (0..(self.kernels.len() * bins))
                .map(|index| format!("Conv_{}", index))
                .collect(),
            TextureSummary::MeanVariance => self
                .kernels
                .iter()
                .flat_map(|(kind, _)| {
                    let name = kind.name();
                    [format!("Conv_{}_Mean", name), format!("Conv_{}_Var", name)]
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self.summary {
            TextureSummary::Histogram { bins } => self.kernels.len() * bins,
            TextureSummary::MeanVariance => self.kernels.len() * 2,
        }
    }

    pub fn compute(&self, cell: &CellImage) -> PipelineResult<Vec<f64>> {
        let mut values = Vec::with_capacity(self.len());

        for (kind, kernel) in &self.kernels {
            let response = filter(cell.gray(), *kind, kernel)?;
            let pixels = response.data_typed::<u8>()?;

            match self.summary {
                TextureSummary::Histogram { bins } => {
                    values.extend(normalized_histogram(pixels.iter().copied(), bins));
                }
                TextureSummary::MeanVariance => {
                    let (mean, var) = mean_variance(pixels);
                    values.push(mean);
                    values.push(var);
                }
            }
        }

        Ok(values)
    }
}

fn filter(gray: &Mat, kind: TextureKernel, kernel: &Mat) -> PipelineResult<Mat> {
    let anchor = core_cv::Point::new(-1, -1);
    let mut response = Mat::default();

    if kind.needs_float_response() {
        let mut float_response = Mat::default();
        imgproc::filter_2d(
            gray,
            &mut float_response,
            core_cv::CV_32F,
            kernel,
            anchor,
            0.0,
            core_cv::BORDER_DEFAULT,
        )?;
        core_cv::convert_scale_abs(&float_response, &mut response, 1.0, 0.0)?;
    } else {
        imgproc::filter_2d(
            gray,
            &mut response,
            -1,
            kernel,
            anchor,
            0.0,
            core_cv::BORDER_DEFAULT,
        )?;
    }

    Ok(response)
}

/// Mean and population variance.
fn mean_variance(pixels: &[u8]) -> (f64, f64) {
    if pixels.is_empty() {
        return (0.0, 0.0);
    }
    let count = pixels.len() as f64;
    let mean = pixels.iter().map(|&value| value as f64).sum::<f64>() / count;
    let var = pixels
        .iter()
        .map(|&value| (value as f64 - mean).powi(2))
        .sum::<f64>()
        / count;
    (mean, var)
}
