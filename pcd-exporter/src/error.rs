use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not open {path} for writing: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("write error: {0}")]
    Write(#[from] std::io::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("unsupported output extension: {0:?}")]
    UnsupportedExtension(String),
}

impl ExportError {
    pub(crate) fn open(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExportError::Open {
            path: path.into(),
            source,
        }
    }
}
