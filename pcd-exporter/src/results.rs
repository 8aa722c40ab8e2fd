//! Appends normalized feature vectors to CSV corpora.

use std::{
    fs::{File, OpenOptions},
    path::{Path, PathBuf},
};

use pcd_metrics::FeatureVector;

use crate::ExportError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// One file; rows are `input,metric_i,n_k,p0,...`.
    #[default]
    Combined,
    /// One file per metric and neighborhood size; rows are `input,p0,...`.
    Split,
}

/// Name of the split-mode file for a metric index and neighborhood size,
/// e.g. `out_M02_N10.csv`.
pub fn split_file_name(base: &Path, metric_index: usize, neighborhood: usize) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(format!("_M{:02}_N{:02}.csv", metric_index, neighborhood));
    PathBuf::from(name)
}

pub struct ResultWriter {
    path: PathBuf,
    mode: OutputMode,
}

impl ResultWriter {
    pub fn new(path: impl Into<PathBuf>, mode: OutputMode) -> Self {
        Self {
            path: path.into(),
            mode,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Appends one row per feature vector, labelled with `input`.
    ///
    /// Returns the files written to.
    pub fn write(&self, input: &str, vectors: &[FeatureVector]) -> Result<Vec<PathBuf>, ExportError> {
        match self.mode {
            OutputMode::Combined => {
                let mut writer = open_append(&self.path)?;
                for vector in vectors {
                    let mut row = vec![
                        input.to_string(),
                        format!("metric_{}", vector.metric.index()),
                        format!("n_{}", vector.neighborhood),
                    ];
                    row.extend(vector.formatted());
                    writer.write_record(&row)?;
                }
                writer.flush()?;
                log::info!("appended {} rows to {}", vectors.len(), self.path.display());
                Ok(vec![self.path.clone()])
            }
            OutputMode::Split => {
                let mut written = Vec::with_capacity(vectors.len());
                for vector in vectors {
                    let path = split_file_name(&self.path, vector.metric.index(), vector.neighborhood);
                    let mut writer = open_append(&path)?;
                    let mut row = vec![input.to_string()];
                    row.extend(vector.formatted());
                    writer.write_record(&row)?;
                    writer.flush()?;
                    log::debug!("appended {} to {}", vector.metric, path.display());
                    written.push(path);
                }
                log::info!("appended rows to {} split files", written.len());
                Ok(written)
            }
        }
    }
}

fn open_append(path: &Path) -> Result<csv::Writer<File>, ExportError> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ExportError::open(path, e))?;
    Ok(csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(file))
}
