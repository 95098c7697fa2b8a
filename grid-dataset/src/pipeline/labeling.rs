use super::RunSummary;
use crate::{
    assign::BoxToGridAssigner,
    common::*,
    config::{Config, SplitTag},
    grid::GridIndexer,
    normalize::{file_name_of, ImageNormalizer, ResolutionPolicy},
    source::{DetectionSource, ImageSource},
    table::{LabelRecord, LabelTable, RunManifest, UpsertOutcome},
    PipelineResult,
};

/// Input and output locations of a labeling run.
#[derive(Debug, Clone)]
pub struct LabelingOptions {
    pub image_dir: PathBuf,
    pub detections: PathBuf,
    pub label_table: PathBuf,
    /// Where accepted images are written after resizing, if anywhere.
    pub export_dir: Option<PathBuf>,
}

/// Label every image of a folder from detector output and upsert the rows
/// into the label table.
///
/// Images below the canonical resolution are skipped. The table is saved
/// after every labeled image.
pub fn label_images(config: &Config, options: &LabelingOptions) -> PipelineResult<RunSummary> {
    config.validate()?;

    let LabelingOptions {
        image_dir,
        detections,
        label_table,
        export_dir,
    } = options;

    let normalizer = ImageNormalizer::new(config.canonical_size.hw());
    let grid = GridIndexer::new(normalizer.canonical_size());
    let assigner = BoxToGridAssigner::new(grid, config.labeling.overlap_threshold);
    let split = config.labeling.split_tag;

    let images = ImageSource::scan(image_dir, &config.image_extensions)?;
    let detections = DetectionSource::open(detections, config.labeling.confidence_threshold)?;
    let mut table = LabelTable::open_or_default(label_table)?;

    info!(
        "label {} images in '{}' into '{}'",
        images.len(),
        images.dir().display(),
        label_table.display()
    );

    let mut summary = RunSummary::default();

    for (index, path) in images.files().iter().enumerate() {
        let display_name = path.display().to_string();
        let result = label_one(
            &normalizer,
            &assigner,
            &detections,
            split,
            export_dir.as_deref(),
            path,
        );

        let record = match summary.record(&display_name, result)? {
            Some(record) => record,
            None => continue,
        };

        let outcome = table.upsert(&record);
        table.save()?;
        summary.rows_written += 1;

        info!(
            "[{}/{}] {} {}, {} cells labeled",
            index + 1,
            images.len(),
            match outcome {
                UpsertOutcome::Inserted => "inserted",
                UpsertOutcome::Replaced => "replaced",
            },
            record.image_file_name,
            record.labels.occupied().len()
        );
    }

    // an empty run still leaves a table with a header behind
    if table.is_empty() {
        table.save()?;
    }

    let manifest = RunManifest {
        images_processed: summary.images_processed,
        images_skipped: summary.images_skipped,
        rows_written: summary.rows_written,
        ..RunManifest::new(config, &grid, None)
    };
    manifest.save(label_table)?;

    info!(
        "labeling finished: {} processed, {} skipped",
        summary.images_processed, summary.images_skipped
    );

    Ok(summary)
}

fn label_one(
    normalizer: &ImageNormalizer,
    assigner: &BoxToGridAssigner,
    detections: &DetectionSource,
    split: SplitTag,
    export_dir: Option<&Path>,
    path: &Path,
) -> PipelineResult<LabelRecord> {
    let file_name = file_name_of(path)?;
    let image = normalizer.load(path, ResolutionPolicy::RejectSmaller)?;

    if let Some(dir) = export_dir {
        normalizer.save(&image, dir)?;
    }

    let labels = assigner.assign(detections.detections_for(&file_name));
    Ok(LabelRecord::new(file_name, split, labels))
}
