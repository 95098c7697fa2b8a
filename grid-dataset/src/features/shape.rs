use crate::{common::*, config::ShapeConfig, PipelineResult};
use std::f64::consts::PI;

/// Line and circle counts detected in a grayscale cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShapeCounts {
    pub lines: usize,
    pub circles: usize,
}

pub const SHAPE_COLUMNS: [&str; 2] = ["Shape_Lines", "Shape_Circles"];

#[derive(Debug, Clone)]
pub struct ShapeCounter {
    config: ShapeConfig,
}

impl ShapeCounter {
    pub fn new(config: &ShapeConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Line segments are found on the Canny edge map, circles on the
    /// grayscale cell itself.
    pub fn count(&self, gray: &Mat) -> PipelineResult<ShapeCounts> {
        let ShapeConfig {
            canny_low,
            canny_high,
            canny_aperture,
            ref lines,
            ref circles,
        } = self.config;

        let mut edges = Mat::default();
        imgproc::canny(
            gray,
            &mut edges,
            canny_low.raw(),
            canny_high.raw(),
            canny_aperture,
            false,
        )?;

        let mut segments = Vector::<core_cv::Vec4i>::new();
        imgproc::hough_lines_p(
            &edges,
            &mut segments,
            lines.rho.raw(),
            lines.theta_degrees.raw() * PI / 180.0,
            lines.threshold,
            lines.min_length.raw(),
            lines.max_gap.raw(),
        )?;

        let mut found = Vector::<core_cv::Vec3f>::new();
        imgproc::hough_circles(
            gray,
            &mut found,
            imgproc::HOUGH_GRADIENT,
            circles.dp.raw(),
            circles.min_dist.raw(),
            circles.param1.raw(),
            circles.param2.raw(),
            circles.min_radius,
            circles.max_radius,
        )?;

        Ok(ShapeCounts {
            lines: segments.len(),
            circles: found.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_canvas() -> Mat {
        Mat::new_rows_cols_with_default(75, 100, core_cv::CV_8UC1, Scalar::all(0.0)).unwrap()
    }

    #[test]
    fn flat_cell_has_no_shapes() {
        let counter = ShapeCounter::new(&ShapeConfig::default());
        let counts = counter.count(&gray_canvas()).unwrap();
        assert_eq!(counts, ShapeCounts::default());
    }

    #[test]
    fn drawn_line_is_detected() {
        let mut canvas = gray_canvas();
        imgproc::line(
            &mut canvas,
            core_cv::Point::new(10, 37),
            core_cv::Point::new(90, 37),
            Scalar::all(255.0),
            3,
            imgproc::LINE_8,
            0,
        )
        .unwrap();

        let counter = ShapeCounter::new(&ShapeConfig::default());
        let counts = counter.count(&canvas).unwrap();
        assert!(counts.lines >= 1);
    }

    #[test]
    fn drawn_disc_is_detected() {
        let mut canvas = gray_canvas();
        imgproc::circle(
            &mut canvas,
            core_cv::Point::new(50, 37),
            20,
            Scalar::all(255.0),
            -1,
            imgproc::LINE_8,
            0,
        )
        .unwrap();

        let counter = ShapeCounter::new(&ShapeConfig::default());
        let counts = counter.count(&canvas).unwrap();
        assert!(counts.circles >= 1);
    }
}
