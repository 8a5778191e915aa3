//! Sources of the historical accident dataset.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, instrument};

use crate::parser::parse_dataset;
use crate::record::AccidentRecord;

/// Dataset-level failures. Each of these degrades a request instead of
/// failing it.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("accident dataset not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read accident dataset {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse accident dataset: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no valid accident records found ({rejected} rejected)")]
    NoValidRecords { rejected: usize },
}

/// Provides the raw historical records.
pub trait DatasetLoader: Send + Sync {
    fn load(&self) -> Result<Vec<AccidentRecord>, DatasetError>;
}

/// Reads a UTF-8 JSON array of records from disk.
pub struct JsonFileLoader {
    path: PathBuf,
}

impl JsonFileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DatasetLoader for JsonFileLoader {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<Vec<AccidentRecord>, DatasetError> {
        let bytes = std::fs::read(&self.path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                DatasetError::NotFound(self.path.clone())
            } else {
                DatasetError::Io {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        let records = parse_dataset(&bytes)?;
        debug!(bytes = bytes.len(), records = records.len(), "Dataset loaded");
        Ok(records)
    }
}

/// Serves records already held in memory.
#[derive(Default)]
pub struct InMemoryLoader {
    records: Vec<AccidentRecord>,
}

impl InMemoryLoader {
    pub fn new(records: Vec<AccidentRecord>) -> Self {
        Self { records }
    }
}

impl DatasetLoader for InMemoryLoader {
    fn load(&self) -> Result<Vec<AccidentRecord>, DatasetError> {
        Ok(self.records.clone())
    }
}
