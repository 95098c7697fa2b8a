use super::RunSummary;
use crate::{
    common::*,
    config::Config,
    error::PipelineError,
    features::{CellFeatureExtractor, CellFeatureVector, CellImage},
    grid::GridIndexer,
    normalize::{file_name_of, ImageNormalizer, ResolutionPolicy},
    source::ImageSource,
    table::{FeatureRow, FeatureTableWriter, LabelRecord, LabelTable, RunManifest},
    PipelineResult,
};

/// Input and output locations of a feature extraction run.
#[derive(Debug, Clone)]
pub struct ExtractionOptions {
    pub image_dir: PathBuf,
    pub label_table: PathBuf,
    pub output: PathBuf,
}

/// Write one feature row per cell for every image that has a label row.
///
/// The output table is recreated on every run. All 64 cells of an image are
/// computed before its first row is written, so a failing image leaves no
/// partial rows behind.
pub fn extract_features(config: &Config, options: &ExtractionOptions) -> PipelineResult<RunSummary> {
    config.validate()?;

    let ExtractionOptions {
        image_dir,
        label_table,
        output,
    } = options;

    let table = LabelTable::open(label_table)?;
    let images = ImageSource::scan(image_dir, &config.image_extensions)?;

    let normalizer = ImageNormalizer::new(config.canonical_size.hw());
    let grid = GridIndexer::new(normalizer.canonical_size());
    let extractor = CellFeatureExtractor::new(&config.feature_config())?;
    let layout = extractor.layout(grid.cell_size());
    if layout.is_empty() {
        return Err(PipelineError::config("the feature layout has no columns"));
    }

    info!(
        "extract {} features per cell from {} images in '{}'",
        layout.len(),
        images.len(),
        images.dir().display()
    );

    let mut writer = FeatureTableWriter::create(output, &layout)?;
    let mut summary = RunSummary::default();

    for (index, path) in images.files().iter().enumerate() {
        let display_name = path.display().to_string();

        let record = match lookup_labels(&table, path) {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!("'{}' has no label row, skip it", display_name);
                continue;
            }
            Err(err) => {
                summary.record::<()>(&display_name, Err(err))?;
                continue;
            }
        };

        let result = extract_one(&normalizer, &grid, &extractor, path);
        let cells = match summary.record(&display_name, result)? {
            Some(cells) => cells,
            None => continue,
        };

        for (cell_index, features) in cells.iter().enumerate() {
            writer.write_row(&FeatureRow {
                image_name: &record.image_file_name,
                cell_index,
                label: record.labels[cell_index],
                features,
            })?;
        }
        summary.rows_written += cells.len();

        info!(
            "[{}/{}] {}, {} rows",
            index + 1,
            images.len(),
            record.image_file_name,
            cells.len()
        );
    }

    let rows_written = writer.finish()?;
    debug_assert_eq!(rows_written, summary.rows_written);

    let manifest = RunManifest {
        images_processed: summary.images_processed,
        images_skipped: summary.images_skipped,
        rows_written: summary.rows_written,
        ..RunManifest::new(config, &grid, Some(&layout))
    };
    manifest.save(output)?;

    info!(
        "extraction finished: {} processed, {} skipped, {} rows",
        summary.images_processed, summary.images_skipped, summary.rows_written
    );

    Ok(summary)
}

fn lookup_labels(table: &LabelTable, path: &Path) -> PipelineResult<Option<LabelRecord>> {
    let file_name = file_name_of(path)?;
    table.get(&file_name).transpose()
}

fn extract_one(
    normalizer: &ImageNormalizer,
    grid: &GridIndexer,
    extractor: &CellFeatureExtractor,
    path: &Path,
) -> PipelineResult<Vec<CellFeatureVector>> {
    let image = normalizer.load(path, ResolutionPolicy::AlwaysResize)?;
    let rgb = image.rgb()?;
    let gray = image.gray()?;

    grid.cells()
        .map(|(_, rect)| {
            let cell = CellImage::crop(&rgb, &gray, &rect)?;
            extractor.extract(&cell)
        })
        .collect()
}
