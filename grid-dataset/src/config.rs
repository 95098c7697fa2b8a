//! Run configuration.
//!
//! One immutable [`Config`] is built per run and handed to every component. It
//! is also stored in the manifest next to each output table.

use crate::{common::*, error::PipelineError, grid::GridIndexer, PipelineResult};

pub use canonical::*;
pub use features::*;
pub use labeling::*;

pub static CONFIG_VERSION: Lazy<VersionReq> = Lazy::new(|| VersionReq::parse("0.1").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(
        deserialize_with = "deserialize_version",
        default = "default_version"
    )]
    pub version: Version,
    #[serde(default)]
    pub canonical_size: CanonicalSize,
    #[serde(default)]
    pub labeling: LabelingConfig,
    #[serde(default)]
    pub features: FeatureSettings,
    /// Lowercase file extensions accepted by the image source.
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,
}

impl Config {
    pub fn open<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let text = fs::read_to_string(path)?;
        let config: Self = json5::from_str(&text)?;
        Ok(config)
    }

    /// Replace the feature settings by a named preset.
    pub fn with_preset(self, preset: FeaturePreset) -> Self {
        Self {
            features: FeatureSettings::Preset { preset },
            ..self
        }
    }

    pub fn feature_config(&self) -> FeatureConfig {
        self.features.resolve()
    }

    pub fn validate(&self) -> PipelineResult<()> {
        let CanonicalSize { width, height } = self.canonical_size;
        if width < GridIndexer::COLS || height < GridIndexer::ROWS {
            return Err(PipelineError::config(format!(
                "canonical size {}x{} is smaller than the {}x{} grid",
                width,
                height,
                GridIndexer::COLS,
                GridIndexer::ROWS
            )));
        }
        if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
            return Err(PipelineError::config(format!(
                "canonical size {}x{} is too large",
                width, height
            )));
        }

        self.labeling.validate()?;

        let grid = GridIndexer::new(self.canonical_size.hw());
        self.feature_config().validate(grid.cell_size())?;

        if self.image_extensions.is_empty() {
            return Err(PipelineError::config("image_extensions must not be empty"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            canonical_size: CanonicalSize::default(),
            labeling: LabelingConfig::default(),
            features: FeatureSettings::default(),
            image_extensions: default_image_extensions(),
        }
    }
}

mod canonical {
    use super::*;

    /// The size every image is resized to before grid computations.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct CanonicalSize {
        pub width: usize,
        pub height: usize,
    }

    impl CanonicalSize {
        pub fn hw(&self) -> HW<i32> {
            HW::from_hw([self.height as i32, self.width as i32])
        }
    }

    impl Default for CanonicalSize {
        fn default() -> Self {
            Self {
                width: 800,
                height: 600,
            }
        }
    }
}

mod labeling {
    use super::*;
    use strum::{Display, EnumString};

    /// Grid labeling options.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct LabelingConfig {
        /// A cell is labeled when the overlap with a box exceeds this ratio of the cell area.
        #[serde(default = "default_threshold")]
        pub overlap_threshold: R64,
        /// Only detections scoring strictly above this confidence reach the assigner.
        #[serde(default = "default_threshold")]
        pub confidence_threshold: R64,
        /// The split tag written into new label rows.
        #[serde(default)]
        pub split_tag: SplitTag,
    }

    impl LabelingConfig {
        pub fn validate(&self) -> PipelineResult<()> {
            let unit = r64(0.0)..=r64(1.0);
            if !unit.contains(&self.overlap_threshold) {
                return Err(PipelineError::config(format!(
                    "overlap_threshold {} is not in [0, 1]",
                    self.overlap_threshold
                )));
            }
            if !unit.contains(&self.confidence_threshold) {
                return Err(PipelineError::config(format!(
                    "confidence_threshold {} is not in [0, 1]",
                    self.confidence_threshold
                )));
            }
            Ok(())
        }
    }

    impl Default for LabelingConfig {
        fn default() -> Self {
            Self {
                overlap_threshold: default_threshold(),
                confidence_threshold: default_threshold(),
                split_tag: SplitTag::default(),
            }
        }
    }

    /// The `TrainOrTest` column value.
    #[derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        Hash,
        Default,
        Serialize,
        Deserialize,
        Display,
        EnumString,
    )]
    pub enum SplitTag {
        #[default]
        Train,
        Test,
    }

    fn default_threshold() -> R64 {
        r64(0.15)
    }
}

mod features {
    use super::*;
    use strum::{Display, EnumString, IntoStaticStr};

    /// Feature settings as written in a configuration file, either a named
    /// preset or explicit parameters.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum FeatureSettings {
        Preset { preset: FeaturePreset },
        Custom(FeatureConfig),
    }

    impl FeatureSettings {
        pub fn resolve(&self) -> FeatureConfig {
            match self {
                Self::Preset { preset } => FeatureConfig::preset(*preset),
                Self::Custom(config) => config.clone(),
            }
        }

        pub fn preset(&self) -> Option<FeaturePreset> {
            match *self {
                Self::Preset { preset } => Some(preset),
                Self::Custom(_) => None,
            }
        }
    }

    impl Default for FeatureSettings {
        fn default() -> Self {
            Self::Preset {
                preset: FeaturePreset::Standard,
            }
        }
    }

    /// Named parameter sets used by earlier dataset generations.
    #[derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        Hash,
        Serialize,
        Deserialize,
        Display,
        EnumString,
        IntoStaticStr,
    )]
    #[serde(rename_all = "snake_case")]
    #[strum(serialize_all = "snake_case")]
    pub enum FeaturePreset {
        /// 8×8 HOG cells, 32 colour bins, 16-bin texture histograms.
        Standard,
        /// 16×16 HOG cells, 8 colour bins, texture mean and variance.
        Compact,
    }

    /// Cell feature extraction parameters.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct FeatureConfig {
        pub hog: HogConfig,
        pub color: ColorConfig,
        pub texture: TextureSummary,
        #[serde(default)]
        pub shape: ShapeConfig,
    }

    impl FeatureConfig {
        pub fn preset(preset: FeaturePreset) -> Self {
            match preset {
                FeaturePreset::Standard => Self {
                    hog: HogConfig {
                        orientations: 9,
                        pixels_per_cell: [8, 8],
                        cells_per_block: [2, 2],
                    },
                    color: ColorConfig { bins: 32 },
                    texture: TextureSummary::Histogram { bins: 16 },
                    shape: ShapeConfig::default(),
                },
                FeaturePreset::Compact => Self {
                    hog: HogConfig {
                        orientations: 9,
                        pixels_per_cell: [16, 16],
                        cells_per_block: [2, 2],
                    },
                    color: ColorConfig { bins: 8 },
                    texture: TextureSummary::MeanVariance,
                    shape: ShapeConfig::default(),
                },
            }
        }

        pub fn validate(&self, cell_size: HW<i32>) -> PipelineResult<()> {
            let HogConfig {
                orientations,
                pixels_per_cell: [ppc_h, ppc_w],
                cells_per_block: [cpb_h, cpb_w],
            } = self.hog;

            if orientations == 0 || ppc_h == 0 || ppc_w == 0 || cpb_h == 0 || cpb_w == 0 {
                return Err(PipelineError::config(
                    "hog parameters must be positive".to_string(),
                ));
            }

            let cells_h = cell_size.h() as usize / ppc_h;
            let cells_w = cell_size.w() as usize / ppc_w;
            if cells_h < cpb_h || cells_w < cpb_w {
                return Err(PipelineError::config(format!(
                    "grid cell of {}x{} pixels is too small for a {}x{} HOG block of {}x{} pixel cells",
                    cell_size.w(),
                    cell_size.h(),
                    cpb_w,
                    cpb_h,
                    ppc_w,
                    ppc_h
                )));
            }

            if !(1..=256).contains(&self.color.bins) {
                return Err(PipelineError::config(format!(
                    "color bins {} is not in 1..=256",
                    self.color.bins
                )));
            }

            if let TextureSummary::Histogram { bins } = self.texture {
                if !(1..=256).contains(&bins) {
                    return Err(PipelineError::config(format!(
                        "texture bins {} is not in 1..=256",
                        bins
                    )));
                }
            }

            self.shape.validate()
        }
    }

    impl Default for FeatureConfig {
        fn default() -> Self {
            Self::preset(FeaturePreset::Standard)
        }
    }

    /// Histogram of oriented gradients parameters.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct HogConfig {
        pub orientations: usize,
        /// Sub-cell size as `[height, width]` in pixels.
        pub pixels_per_cell: [usize; 2],
        /// Block size as `[height, width]` in sub-cells.
        pub cells_per_block: [usize; 2],
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ColorConfig {
        pub bins: usize,
    }

    /// How each convolution response is summarized.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(tag = "kind", rename_all = "snake_case")]
    pub enum TextureSummary {
        Histogram { bins: usize },
        MeanVariance,
    }

    /// Edge detector and Hough transform parameters.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct ShapeConfig {
        pub canny_low: R64,
        pub canny_high: R64,
        pub canny_aperture: i32,
        pub lines: LineConfig,
        pub circles: CircleConfig,
    }

    impl ShapeConfig {
        fn validate(&self) -> PipelineResult<()> {
            if self.canny_low > self.canny_high {
                return Err(PipelineError::config(format!(
                    "canny_low {} exceeds canny_high {}",
                    self.canny_low, self.canny_high
                )));
            }
            if ![3, 5, 7].contains(&self.canny_aperture) {
                return Err(PipelineError::config(format!(
                    "canny_aperture must be 3, 5 or 7, but get {}",
                    self.canny_aperture
                )));
            }
            let CircleConfig {
                dp,
                min_radius,
                max_radius,
                ..
            } = self.circles;
            if dp <= 0.0 || min_radius < 0 || max_radius < min_radius {
                return Err(PipelineError::config(format!(
                    "invalid circle parameters dp={} radius={}..{}",
                    dp, min_radius, max_radius
                )));
            }
            if self.lines.rho <= 0.0 || self.lines.theta_degrees <= 0.0 {
                return Err(PipelineError::config(
                    "line resolution must be positive".to_string(),
                ));
            }
            Ok(())
        }
    }

    impl Default for ShapeConfig {
        fn default() -> Self {
            Self {
                canny_low: r64(50.0),
                canny_high: r64(150.0),
                canny_aperture: 3,
                lines: LineConfig::default(),
                circles: CircleConfig::default(),
            }
        }
    }

    /// Probabilistic Hough line transform parameters.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct LineConfig {
        pub rho: R64,
        pub theta_degrees: R64,
        pub threshold: i32,
        pub min_length: R64,
        pub max_gap: R64,
    }

    impl Default for LineConfig {
        fn default() -> Self {
            Self {
                rho: r64(1.0),
                theta_degrees: r64(1.0),
                threshold: 30,
                min_length: r64(20.0),
                max_gap: r64(10.0),
            }
        }
    }

    /// Hough gradient circle transform parameters.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct CircleConfig {
        pub dp: R64,
        pub min_dist: R64,
        pub param1: R64,
        pub param2: R64,
        pub min_radius: i32,
        pub max_radius: i32,
    }

    impl Default for CircleConfig {
        fn default() -> Self {
            Self {
                dp: r64(1.2),
                min_dist: r64(20.0),
                param1: r64(50.0),
                param2: r64(30.0),
                min_radius: 5,
                max_radius: 50,
            }
        }
    }
}

fn default_version() -> Version {
    Version::new(0, 1, 0)
}

fn default_image_extensions() -> Vec<String> {
    ["jpg", "jpeg", "png", "bmp", "webp"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

pub fn deserialize_version<'de, D>(deserializer: D) -> Result<Version, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    let version = Version::parse(&text).map_err(|err| {
        D::Error::custom(format!(
            "failed to parse version number '{}': {:?}",
            text, err
        ))
    })?;

    if !CONFIG_VERSION.matches(&version) {
        return Err(D::Error::custom(format!(
            "incompatible version: get '{}', but it is incompatible with requirement '{}'",
            version, &*CONFIG_VERSION,
        )));
    }

    Ok(version)
}
