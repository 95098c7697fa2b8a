//! Image loading and resizing to the canonical size.

use crate::{common::*, error::PipelineError, PipelineResult};

/// How an image smaller than the canonical size is treated.
///
/// The labeling path rejects small images so that no label is drawn on an
/// upscaled picture, while the feature path resizes everything it is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPolicy {
    RejectSmaller,
    AlwaysResize,
}

impl ResolutionPolicy {
    fn interpolation(&self) -> i32 {
        match self {
            Self::RejectSmaller => imgproc::INTER_LINEAR,
            Self::AlwaysResize => imgproc::INTER_LANCZOS4,
        }
    }
}

/// An image resized to the canonical size, in BGR channel order.
#[derive(Debug)]
pub struct NormalizedImage {
    pub file_name: String,
    pub bgr: Mat,
    pub source_size: HW<i32>,
    /// Whether the source met the minimum resolution.
    pub resolution_accepted: bool,
}

impl NormalizedImage {
    pub fn size(&self) -> PipelineResult<HW<i32>> {
        mat_size(&self.bgr)
    }

    pub fn rgb(&self) -> PipelineResult<Mat> {
        let mut rgb = Mat::default();
        imgproc::cvt_color(&self.bgr, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;
        Ok(rgb)
    }

    pub fn gray(&self) -> PipelineResult<Mat> {
        let mut gray = Mat::default();
        imgproc::cvt_color(&self.bgr, &mut gray, imgproc::COLOR_BGR2GRAY, 0)?;
        Ok(gray)
    }
}

#[derive(Debug, Clone)]
pub struct ImageNormalizer {
    canonical_size: HW<i32>,
}

impl ImageNormalizer {
    pub fn new(canonical_size: HW<i32>) -> Self {
        Self { canonical_size }
    }

    pub fn canonical_size(&self) -> HW<i32> {
        self.canonical_size
    }

    /// Read an image file and resize it to the canonical size.
    pub fn load(
        &self,
        path: impl AsRef<Path>,
        policy: ResolutionPolicy,
    ) -> PipelineResult<NormalizedImage> {
        let path = path.as_ref();
        let file_name = file_name_of(path)?;

        if !path.is_file() {
            return Err(PipelineError::io(
                path,
                io::Error::new(io::ErrorKind::NotFound, "no such image file"),
            ));
        }
        let path_str = path.to_str().ok_or_else(|| PipelineError::Image {
            path: path.to_owned(),
            reason: "path is not valid UTF-8".to_string(),
        })?;

        let image = imgcodecs::imread(path_str, imgcodecs::IMREAD_COLOR)?;
        let size = mat_size(&image)?;
        if size.area() == 0 {
            return Err(PipelineError::Image {
                path: path.to_owned(),
                reason: "the file is not a decodable image".to_string(),
            });
        }

        self.normalize(file_name, &image, policy)
    }

    /// Resize a decoded BGR image to the canonical size.
    pub fn normalize(
        &self,
        file_name: impl Into<String>,
        image: &Mat,
        policy: ResolutionPolicy,
    ) -> PipelineResult<NormalizedImage> {
        let file_name = file_name.into();
        let source_size = mat_size(image)?;
        let resolution_accepted = source_size.covers(&self.canonical_size);

        if policy == ResolutionPolicy::RejectSmaller && !resolution_accepted {
            return Err(PipelineError::validation(
                file_name,
                format!(
                    "resolution {} is below the minimum {}",
                    source_size, self.canonical_size
                ),
            ));
        }

        let bgr = if source_size == self.canonical_size {
            let mut copy = Mat::default();
            image.copy_to(&mut copy)?;
            copy
        } else {
            let mut resized = Mat::default();
            imgproc::resize(
                image,
                &mut resized,
                self.canonical_size.into(),
                0.0,
                0.0,
                policy.interpolation(),
            )?;
            resized
        };

        Ok(NormalizedImage {
            file_name,
            bgr,
            source_size,
            resolution_accepted,
        })
    }

    /// Write a normalized image to `dir` under its original file name.
    pub fn save(&self, image: &NormalizedImage, dir: impl AsRef<Path>) -> PipelineResult<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|err| PipelineError::io(dir, err))?;

        let path = dir.join(&image.file_name);
        let path_str = path.to_str().ok_or_else(|| PipelineError::Image {
            path: path.clone(),
            reason: "path is not valid UTF-8".to_string(),
        })?;
        let written = imgcodecs::imwrite(path_str, &image.bgr, &Vector::new())?;
        if !written {
            return Err(PipelineError::Image {
                path,
                reason: "the encoder refused to write the image".to_string(),
            });
        }
        Ok(path)
    }
}

pub(crate) fn mat_size(mat: &Mat) -> PipelineResult<HW<i32>> {
    let size = mat.size()?;
    HW::try_from(size).map_err(|err| PipelineError::Image {
        path: PathBuf::new(),
        reason: format!("{:#}", err),
    })
}

pub(crate) fn file_name_of(path: &Path) -> PipelineResult<String> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.to_string())
        .ok_or_else(|| PipelineError::Image {
            path: path.to_owned(),
            reason: "the path has no UTF-8 file name".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_image(h: i32, w: i32) -> Mat {
        Mat::new_rows_cols_with_default(h, w, core_cv::CV_8UC3, Scalar::new(10.0, 20.0, 30.0, 0.0))
            .unwrap()
    }

    #[test]
    fn labeling_policy_rejects_small_images() {
        let normalizer = ImageNormalizer::new(HW::from_hw([600, 800]));
        let err = normalizer
            .normalize("small.jpg", &solid_image(599, 1000), ResolutionPolicy::RejectSmaller)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Validation { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn labeling_policy_downscales_large_images() {
        let normalizer = ImageNormalizer::new(HW::from_hw([600, 800]));
        let image = normalizer
            .normalize("large.jpg", &solid_image(1200, 1600), ResolutionPolicy::RejectSmaller)
            .unwrap();
        assert!(image.resolution_accepted);
        assert_eq!(image.source_size, HW::from_hw([1200, 1600]));
        assert_eq!(image.size().unwrap(), HW::from_hw([600, 800]));
    }

    #[test]
    fn feature_policy_upscales_small_images() {
        let normalizer = ImageNormalizer::new(HW::from_hw([600, 800]));
        let image = normalizer
            .normalize("small.jpg", &solid_image(300, 400), ResolutionPolicy::AlwaysResize)
            .unwrap();
        assert!(!image.resolution_accepted);
        assert_eq!(image.size().unwrap(), HW::from_hw([600, 800]));

        let gray = image.gray().unwrap();
        assert_eq!(*gray.at_2d::<u8>(5, 5).unwrap(), *gray.at_2d::<u8>(500, 700).unwrap());
        let rgb = image.rgb().unwrap();
        let pixel = rgb.at_2d::<core_cv::Vec3b>(10, 10).unwrap();
        assert_eq!(pixel.0, [30, 20, 10]);
    }

    #[test]
    fn load_reports_missing_and_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        let normalizer = ImageNormalizer::new(HW::from_hw([600, 800]));

        let err = normalizer
            .load(dir.path().join("missing.jpg"), ResolutionPolicy::AlwaysResize)
            .unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));

        let corrupt = dir.path().join("corrupt.jpg");
        fs::write(&corrupt, b"definitely not a jpeg").unwrap();
        let err = normalizer
            .load(&corrupt, ResolutionPolicy::AlwaysResize)
            .unwrap_err();
        assert!(!err.is_fatal());
    }

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let normalizer = ImageNormalizer::new(HW::from_hw([600, 800]));
        let image = normalizer
            .normalize("frame.png", &solid_image(900, 1200), ResolutionPolicy::RejectSmaller)
            .unwrap();
        let path = normalizer.save(&image, dir.path().join("processed")).unwrap();
        assert!(path.ends_with("processed/frame.png"));

        let reloaded = normalizer
            .load(&path, ResolutionPolicy::RejectSmaller)
            .unwrap();
        assert_eq!(reloaded.file_name, "frame.png");
        assert_eq!(reloaded.source_size, HW::from_hw([600, 800]));
    }
}
