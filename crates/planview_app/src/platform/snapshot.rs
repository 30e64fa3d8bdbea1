use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Writes the rendered page to a fixed path by way of a temp file and rename,
/// so a browser reloading the page never sees a half-written file.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    target: PathBuf,
}

impl SnapshotWriter {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
        }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn write(&self, content: &str) -> Result<&Path, SnapshotError> {
        let dir = match self.target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        ensure_dir(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.as_file_mut().sync_all()?;

        // Rename does not replace an existing file on every platform.
        if cfg!(windows) && self.target.exists() {
            fs::remove_file(&self.target)?;
        }
        tmp.persist(&self.target).map_err(|e| SnapshotError::Io(e.error))?;
        Ok(&self.target)
    }
}

fn ensure_dir(dir: &Path) -> Result<(), SnapshotError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| SnapshotError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(SnapshotError::OutputDir("path is not a directory".into()));
        }
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|e| SnapshotError::OutputDir(e.to_string()))
}
