use crate::{
    common::*,
    config::{Config, FeaturePreset},
    error::PipelineError,
    features::FeatureLayout,
    grid::GridIndexer,
    PipelineResult,
};

/// The sidecar path of a table, `<table>.manifest.json`.
pub fn manifest_path(table_path: impl AsRef<Path>) -> PathBuf {
    let table_path = table_path.as_ref();
    let mut name = table_path.file_name().unwrap_or_default().to_os_string();
    name.push(".manifest.json");
    table_path.with_file_name(name)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridManifest {
    pub rows: usize,
    pub cols: usize,
    pub cell_width: i32,
    pub cell_height: i32,
}

impl From<&GridIndexer> for GridManifest {
    fn from(grid: &GridIndexer) -> Self {
        let cell_size = grid.cell_size();
        Self {
            rows: GridIndexer::ROWS,
            cols: GridIndexer::COLS,
            cell_width: cell_size.w(),
            cell_height: cell_size.h(),
        }
    }
}

/// The record of the parameters and outcome of one run, stored next to its table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub crate_version: String,
    pub config: Config,
    pub preset: Option<FeaturePreset>,
    pub grid: GridManifest,
    /// Feature columns per group, for feature tables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_groups: Option<IndexMap<String, usize>>,
    pub images_processed: usize,
    pub images_skipped: usize,
    pub rows_written: usize,
}

impl RunManifest {
    pub fn new(config: &Config, grid: &GridIndexer, layout: Option<&FeatureLayout>) -> Self {
        Self {
            crate_version: env!("CARGO_PKG_VERSION").to_string(),
            config: config.clone(),
            preset: config.features.preset(),
            grid: grid.into(),
            feature_groups: layout.map(|layout| {
                layout
                    .group_sizes()
                    .into_iter()
                    .map(|(kind, len)| (kind.to_string(), len))
                    .collect()
            }),
            images_processed: 0,
            images_skipped: 0,
            rows_written: 0,
        }
    }

    /// Write the manifest next to `table_path`.
    pub fn save(&self, table_path: impl AsRef<Path>) -> PipelineResult<PathBuf> {
        let path = manifest_path(table_path);
        let file = File::create(&path).map_err(|err| PipelineError::io(&path, err))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .map_err(|err| PipelineError::io(&path, err.into()))?;
        Ok(path)
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("unable to read '{}'", path.display()))?;
        let manifest = serde_json::from_str(&text)?;
        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeatureConfig;
    use crate::features::CellFeatureExtractor;

    #[test]
    fn sidecar_name() {
        assert_eq!(
            manifest_path("out/features.csv"),
            PathBuf::from("out/features.csv.manifest.json")
        );
    }

    #[test]
    fn save_and_open() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("features.csv");

        let config = Config::default().with_preset(FeaturePreset::Compact);
        let grid = GridIndexer::new(config.canonical_size.hw());
        let extractor = CellFeatureExtractor::new(&config.feature_config()).unwrap();
        let layout = extractor.layout(grid.cell_size());

        let mut manifest = RunManifest::new(&config, &grid, Some(&layout));
        manifest.images_processed = 2;
        manifest.rows_written = 128;
        let path = manifest.save(&table).unwrap();

        let loaded = RunManifest::open(&path).unwrap();
        assert_eq!(loaded, manifest);
        assert_eq!(loaded.preset, Some(FeaturePreset::Compact));
        assert_eq!(loaded.grid.cell_width, 100);
        assert_eq!(
            loaded.feature_groups.unwrap()["Color"],
            FeatureConfig::preset(FeaturePreset::Compact).color.bins * 3
        );
    }
}
