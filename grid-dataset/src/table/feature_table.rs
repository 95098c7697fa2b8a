use crate::{
    common::*,
    error::PipelineError,
    features::{CellFeatureVector, FeatureLayout},
    PipelineResult,
};

/// One row of the feature table.
#[derive(Debug, Clone, Copy)]
pub struct FeatureRow<'a> {
    pub image_name: &'a str,
    pub cell_index: usize,
    pub label: GridLabel,
    pub features: &'a CellFeatureVector,
}

impl FeatureRow<'_> {
    fn encode(&self) -> Result<Vec<u8>, csv::Error> {
        let mut encoder = csv::Writer::from_writer(vec![]);
        let fields = [
            self.image_name.to_string(),
            self.cell_index.to_string(),
            self.label.value().to_string(),
        ]
        .into_iter()
        .chain(self.features.values().iter().map(|value| value.to_string()));
        encoder.write_record(fields)?;
        encoder
            .into_inner()
            .map_err(|err| csv::Error::from(into_io_error(err)))
    }
}

fn into_io_error<W>(err: csv::IntoInnerError<W>) -> io::Error {
    io::Error::new(err.error().kind(), err.error().to_string())
}

/// Streaming writer of the feature table.
///
/// Each row is encoded in memory, then written and flushed as a whole. The
/// header is fixed at creation and every row must carry exactly as many
/// feature values as the layout declares. The file is flushed again when the
/// writer is dropped.
#[derive(Debug)]
pub struct FeatureTableWriter {
    path: PathBuf,
    file: File,
    num_features: usize,
    rows_written: usize,
}

impl FeatureTableWriter {
    /// Create or truncate the table at `path` and write the header.
    pub fn create(path: impl AsRef<Path>, layout: &FeatureLayout) -> PipelineResult<Self> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|err| PipelineError::io(dir, err))?;
        }

        let mut encoder = csv::Writer::from_writer(vec![]);
        encoder.write_record(layout.header())?;
        let header = encoder
            .into_inner()
            .map_err(|err| PipelineError::io(path, into_io_error(err)))?;

        let mut file = File::create(path).map_err(|err| PipelineError::io(path, err))?;
        file.write_all(&header)
            .and_then(|()| file.flush())
            .map_err(|err| PipelineError::io(path, err))?;

        Ok(Self {
            path: path.to_owned(),
            file,
            num_features: layout.len(),
            rows_written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn num_features(&self) -> usize {
        self.num_features
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn write_row(&mut self, row: &FeatureRow<'_>) -> PipelineResult<()> {
        if row.features.len() != self.num_features {
            return Err(PipelineError::Schema {
                image: row.image_name.to_string(),
                cell: row.cell_index,
                expected: self.num_features,
                found: row.features.len(),
            });
        }

        let bytes = row.encode()?;
        self.file
            .write_all(&bytes)
            .and_then(|()| self.file.flush())
            .map_err(|err| PipelineError::io(&self.path, err))?;
        self.rows_written += 1;
        Ok(())
    }

    /// Flush and close the table, returning the number of rows written.
    pub fn finish(self) -> PipelineResult<usize> {
        self.file
            .sync_all()
            .map_err(|err| PipelineError::io(&self.path, err))?;
        Ok(self.rows_written)
    }
}

impl Drop for FeatureTableWriter {
    fn drop(&mut self) {
        if let Err(err) = self.file.flush() {
            warn!("failed to flush '{}': {}", self.path.display(), err);
        }
    }
}
