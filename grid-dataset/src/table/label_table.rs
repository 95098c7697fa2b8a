use crate::{common::*, config::SplitTag, error::PipelineError, PipelineResult};
use csv::StringRecord;

pub const IMAGE_FILE_COLUMN: &str = "ImageFileName";
pub const SPLIT_COLUMN: &str = "TrainOrTest";

/// The name of the column holding the label of cell `index`, `c01` through `c64`.
pub fn cell_column_name(index: usize) -> String {
    format!("c{:02}", index + 1)
}

pub fn label_header() -> Vec<String> {
    [IMAGE_FILE_COLUMN.to_string(), SPLIT_COLUMN.to_string()]
        .into_iter()
        .chain((0..NUM_CELLS).map(cell_column_name))
        .collect()
}

/// One row of the label table.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRecord {
    pub image_file_name: String,
    pub split: String,
    pub labels: GridLabelVector,
}

impl LabelRecord {
    pub fn new(image_file_name: impl Into<String>, split: SplitTag, labels: GridLabelVector) -> Self {
        Self {
            image_file_name: image_file_name.into(),
            split: split.to_string(),
            labels,
        }
    }

    /// The split tag, if it is one of the recognized values.
    pub fn split_tag(&self) -> Option<SplitTag> {
        self.split.parse().ok()
    }

    fn to_record(&self) -> StringRecord {
        let mut record = StringRecord::with_capacity(0, 2 + NUM_CELLS);
        record.push_field(&self.image_file_name);
        record.push_field(&self.split);
        self.labels
            .values()
            .iter()
            .for_each(|value| record.push_field(&value.to_string()));
        record
    }

    fn from_record(record: &StringRecord) -> PipelineResult<Self> {
        let image_file_name = record.get(0).unwrap_or_default().to_string();
        let invalid = |reason: String| PipelineError::validation(&image_file_name, reason);

        if record.len() != 2 + NUM_CELLS {
            return Err(invalid(format!(
                "expect {} columns, but get {}",
                2 + NUM_CELLS,
                record.len()
            )));
        }

        let values: Vec<u8> = record
            .iter()
            .skip(2)
            .enumerate()
            .map(|(index, field)| {
                field.trim().parse::<u8>().map_err(|_| {
                    invalid(format!(
                        "column {} holds '{}', which is not a grid label",
                        cell_column_name(index),
                        field
                    ))
                })
            })
            .collect::<PipelineResult<_>>()?;
        let labels =
            GridLabelVector::from_values(&values).map_err(|err| invalid(format!("{:#}", err)))?;

        Ok(Self {
            split: record.get(1).unwrap_or_default().to_string(),
            image_file_name,
            labels,
        })
    }
}

/// Whether an upsert added a new row or overwrote an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Replaced,
}

/// The label table in file order.
///
/// Rows are kept as raw records so that rows this run does not touch are
/// written back exactly as they were read. Rows without an image file name
/// are kept but never matched. Repeated file names all stay in the table;
/// lookups see the first of them and upserts overwrite every one.
#[derive(Debug)]
pub struct LabelTable {
    path: PathBuf,
    rows: Vec<StringRecord>,
    index: IndexMap<String, Vec<usize>>,
}

impl LabelTable {
    /// Open an existing label table. A missing table is a configuration error.
    pub fn open(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(PipelineError::config(format!(
                "label table '{}' does not exist",
                path.display()
            )));
        }
        Self::read(path)
    }

    /// Open the label table at `path`, or start an empty one if it does not exist yet.
    pub fn open_or_default(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::read(path)
        } else {
            Ok(Self {
                path: path.to_owned(),
                rows: vec![],
                index: IndexMap::new(),
            })
        }
    }

    fn read(path: &Path) -> PipelineResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)?;

        let header: Vec<&str> = reader.headers()?.iter().collect();
        if header != label_header() {
            return Err(PipelineError::config(format!(
                "'{}' does not have the label table header",
                path.display()
            )));
        }

        let rows: Vec<StringRecord> = reader.records().collect::<Result<_, _>>()?;
        let mut index: IndexMap<String, Vec<usize>> = IndexMap::new();

        for (line, record) in rows.iter().enumerate() {
            match record.get(0) {
                Some(name) if !name.is_empty() => {
                    let lines = index.entry(name.to_string()).or_default();
                    if !lines.is_empty() {
                        warn!(
                            "duplicated row for '{}' in '{}', read the first one",
                            name,
                            path.display()
                        );
                    }
                    lines.push(line);
                }
                _ => {
                    warn!(
                        "row {} in '{}' has no image file name",
                        line + 1,
                        path.display()
                    );
                }
            }
        }

        debug!(
            "read {} label rows for {} images from '{}'",
            rows.len(),
            index.len(),
            path.display()
        );

        Ok(Self {
            path: path.to_owned(),
            rows,
            index,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The number of rows, including unnamed and repeated ones.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct image file names in order of first appearance.
    pub fn image_file_names(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(|name| name.as_str())
    }

    /// Look up and parse the row of an image.
    pub fn get(&self, image_file_name: &str) -> Option<PipelineResult<LabelRecord>> {
        let &first = self.index.get(image_file_name)?.first()?;
        Some(LabelRecord::from_record(&self.rows[first]))
    }

    /// Overwrite the rows of the same image in place, or append a new row.
    pub fn upsert(&mut self, record: &LabelRecord) -> UpsertOutcome {
        let row = record.to_record();
        match self.index.get(&record.image_file_name) {
            Some(lines) => {
                lines
                    .iter()
                    .for_each(|&line| self.rows[line] = row.clone());
                UpsertOutcome::Replaced
            }
            None => {
                self.index
                    .insert(record.image_file_name.clone(), vec![self.rows.len()]);
                self.rows.push(row);
                UpsertOutcome::Inserted
            }
        }
    }

    /// Write the table through a temporary sibling file renamed into place.
    pub fn save(&self) -> PipelineResult<()> {
        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|err| PipelineError::io(dir, err))?;
        }

        let tmp_path = {
            let mut name = self.path.file_name().unwrap_or_default().to_os_string();
            name.push(".tmp");
            self.path.with_file_name(name)
        };

        {
            let mut writer = csv::WriterBuilder::new()
                .flexible(true)
                .from_path(&tmp_path)?;
            writer.write_record(label_header())?;
            for record in &self.rows {
                writer.write_record(record)?;
            }
            writer
                .flush()
                .map_err(|err| PipelineError::io(&tmp_path, err))?;
        }

        fs::rename(&tmp_path, &self.path).map_err(|err| PipelineError::io(&self.path, err))?;
        Ok(())
    }
}
