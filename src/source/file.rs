//! File-based data source.
//!
//! Polls a JSON or newline-delimited JSON file for records.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use diagchart_types::Record;

use super::{records_from_str, DataSource};
use crate::error::SourceError;

/// A data source that reads records from a file.
///
/// The source tracks the file's modification time and only returns
/// new data when the file has been updated.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_error: Option<String>,
    last_modified: Option<SystemTime>,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            last_error: None,
            last_modified: None,
        }
    }

    /// Returns the path being monitored.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    /// Read and parse the file.
    pub fn read(&self) -> Result<Vec<Record>, SourceError> {
        let content = fs::read_to_string(&self.path)?;
        records_from_str(&content)
    }
}

impl DataSource for FileSource {
    fn poll(&mut self) -> Option<Vec<Record>> {
        let current_modified = self.modified_time();

        let file_changed = match (&self.last_modified, &current_modified) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(last), Some(current)) => current > last,
        };
        if !file_changed {
            return None;
        }

        match self.read() {
            Ok(records) => {
                tracing::debug!(path = %self.path.display(), records = records.len(), "read records");
                self.last_error = None;
                self.last_modified = current_modified;
                Some(records)
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read records");
                self.last_error = Some(e.to_string());
                None
            }
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
