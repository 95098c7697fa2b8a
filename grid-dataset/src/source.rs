//! Enumeration of input images and detector output.

use crate::{common::*, error::PipelineError, PipelineResult};

/// The image files of a folder with an allowed extension, sorted by file name.
#[derive(Debug, Clone)]
pub struct ImageSource {
    dir: PathBuf,
    files: Vec<PathBuf>,
}

impl ImageSource {
    pub fn scan(dir: impl AsRef<Path>, extensions: &[String]) -> PipelineResult<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(PipelineError::config(format!(
                "image directory '{}' does not exist",
                dir.display()
            )));
        }

        let pattern = format!("{}/*", glob::Pattern::escape(&dir.display().to_string()));
        let paths = glob::glob(&pattern)
            .map_err(|err| PipelineError::config(format!("invalid image directory: {}", err)))?;

        let mut files: Vec<PathBuf> = paths
            .filter_map(|result| match result {
                Ok(path) => Some(path),
                Err(err) => {
                    warn!("unable to access '{}': {}", err.path().display(), err.error());
                    None
                }
            })
            .filter(|path| path.is_file() && has_extension(path, extensions))
            .collect();
        files.sort_by(|lhs, rhs| lhs.file_name().cmp(&rhs.file_name()));

        debug!("found {} images in '{}'", files.len(), dir.display());

        Ok(Self {
            dir: dir.to_owned(),
            files,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DetectionRecord {
    image_file_name: String,
    class_id: usize,
    confidence: f64,
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

/// Detector output grouped per image, in file order.
///
/// Only detections scoring strictly above the confidence threshold are kept,
/// so the remaining lists can be passed to the assigner as is.
#[derive(Debug, Clone, Default)]
pub struct DetectionSource {
    detections: IndexMap<String, Vec<Detection>>,
}

impl DetectionSource {
    pub fn open(path: impl AsRef<Path>, confidence_threshold: R64) -> PipelineResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(PipelineError::config(format!(
                "detection file '{}' does not exist",
                path.display()
            )));
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .comment(Some(b'#'))
            .trim(csv::Trim::All)
            .from_path(path)?;

        let mut detections: IndexMap<String, Vec<Detection>> = IndexMap::new();
        let mut num_dropped = 0;

        for (line, result) in reader.deserialize::<DetectionRecord>().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(err) => {
                    warn!(
                        "ignore malformed detection row {} in '{}': {}",
                        line + 1,
                        path.display(),
                        err
                    );
                    continue;
                }
            };

            if !record.confidence.is_finite() {
                warn!(
                    "ignore detection row {} in '{}' with confidence {}",
                    line + 1,
                    path.display(),
                    record.confidence
                );
                continue;
            }
            if record.confidence <= confidence_threshold.raw() {
                num_dropped += 1;
                continue;
            }

            let DetectionRecord {
                image_file_name,
                class_id,
                confidence,
                x1,
                y1,
                x2,
                y2,
            } = record;
            detections
                .entry(image_file_name)
                .or_default()
                .push(Detection::new(class_id, confidence, [x1, y1, x2, y2]));
        }

        debug!(
            "loaded detections for {} images from '{}', {} not above confidence {}",
            detections.len(),
            path.display(),
            num_dropped,
            confidence_threshold
        );

        Ok(Self { detections })
    }

    /// The detections of an image, or an empty slice if it has none.
    pub fn detections_for(&self, image_file_name: &str) -> &[Detection] {
        self.detections
            .get(image_file_name)
            .map(|detections| detections.as_slice())
            .unwrap_or(&[])
    }

    pub fn num_images(&self) -> usize {
        self.detections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.JPG", "a.png", "c.txt", "d.webp", "noext"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("nested.jpg")).unwrap();

        let extensions: Vec<String> = ["jpg", "png", "webp"].iter().map(|s| s.to_string()).collect();
        let source = ImageSource::scan(dir.path(), &extensions).unwrap();
        let names: Vec<_> = source
            .files()
            .iter()
            .map(|path| path.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.png", "b.JPG", "d.webp"]);
    }

    #[test]
    fn scan_missing_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImageSource::scan(dir.path().join("missing"), &["jpg".to_string()]).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn detections_are_grouped_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("detections.csv");
        fs::write(
            &path,
            "ImageFileName,ClassId,Confidence,X1,Y1,X2,Y2\n\
             a.jpg,0,0.9,100,100,200,200\n\
             b.jpg,1,0.10,0,0,10,10\n\
             a.jpg,2,0.16,0,0,100,75\n\
             a.jpg,1,0.15,0,0,800,600\n\
             a.jpg,x,0.9,0,0,100,75\n\
             c.jpg,1,0.5,5,5,50,50\n",
        )
        .unwrap();

        let source = DetectionSource::open(&path, r64(0.15)).unwrap();
        assert_eq!(source.num_images(), 2);

        let a = source.detections_for("a.jpg");
        assert_eq!(a.len(), 2);
        assert_eq!(a[0].class_id, 0);
        assert_eq!(a[0].xyxy, [100.0, 100.0, 200.0, 200.0]);
        assert_eq!(a[1].class_id, 2);

        assert!(source.detections_for("b.jpg").is_empty());
        assert_eq!(source.detections_for("c.jpg").len(), 1);
    }
}
