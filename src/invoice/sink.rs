// Download sinks for finished invoice documents

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use tracing::info;

use crate::error::AppError;

/// Receives the finished document. Called at most once per build.
pub trait DocumentSink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<(), AppError>;
}

/// Writes documents into a directory on disk.
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectorySink { dir: dir.into() }
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }
}

impl DocumentSink for DirectorySink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<(), AppError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(file_name);
        let file = File::create(&path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(bytes)?;
        writer.flush()?;
        info!("Saved {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SavedDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Keeps saved documents in memory, for callers that stream the bytes
/// elsewhere themselves.
#[derive(Default)]
pub struct MemorySink {
    saved: Mutex<Vec<SavedDocument>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents saved so far. The list is append-only; a poisoned lock is
    /// read through.
    pub fn saved(&self) -> Vec<SavedDocument> {
        self.saved.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl DocumentSink for MemorySink {
    fn save(&self, file_name: &str, bytes: &[u8]) -> Result<(), AppError> {
        let mut saved = self.saved.lock().unwrap_or_else(PoisonError::into_inner);
        saved.push(SavedDocument {
            file_name: file_name.to_string(),
            bytes: bytes.to_vec(),
        });
        Ok(())
    }
}
