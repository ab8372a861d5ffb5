//! Model slot persistence.
//!
//! The slot holds exactly one model; every save replaces it. The file store
//! writes through a temp file in the same directory and renames it into
//! place, so a reader never sees a half-written artifact. There is no
//! locking: two processes training at once is last-writer-wins.

use crate::model::DifficultyModel;
use std::cell::RefCell;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

pub const MODEL_FILE_NAME: &str = "word_difficulty_model.json";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to access model file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Model file {path} is unreadable: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to serialize model: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl serde::Serialize for StoreError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub trait ModelStore {
    /// Replace the stored model.
    fn save(&self, model: &DifficultyModel) -> Result<(), StoreError>;

    /// The stored model, or `None` if nothing has been trained yet.
    fn load(&self) -> Result<Option<DifficultyModel>, StoreError>;
}

/// Model slot backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct FileModelStore {
    path: PathBuf,
}

impl FileModelStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ModelStore for FileModelStore {
    fn save(&self, model: &DifficultyModel) -> Result<(), StoreError> {
        let parent_dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent_dir).map_err(|e| self.io_error(e))?;

        // Serialize before touching the filesystem so a failure leaves no trace.
        let json = serde_json::to_vec(model)?;

        let temp_file = NamedTempFile::new_in(parent_dir).map_err(|e| self.io_error(e))?;
        {
            let mut writer = BufWriter::new(&temp_file);
            writer.write_all(&json).map_err(|e| self.io_error(e))?;
            writer.flush().map_err(|e| self.io_error(e))?;
        }
        temp_file
            .persist(&self.path)
            .map_err(|e| self.io_error(e.error))?;

        debug!(path = %self.path.display(), bytes = json.len(), "Saved model");
        Ok(())
    }

    fn load(&self) -> Result<Option<DifficultyModel>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };

        let model = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            StoreError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        Ok(Some(model))
    }
}

/// In-process model slot, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryModelStore {
    slot: RefCell<Option<DifficultyModel>>,
}

impl MemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.borrow().is_none()
    }
}

impl ModelStore for MemoryModelStore {
    fn save(&self, model: &DifficultyModel) -> Result<(), StoreError> {
        *self.slot.borrow_mut() = Some(model.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<DifficultyModel>, StoreError> {
        Ok(self.slot.borrow().clone())
    }
}
