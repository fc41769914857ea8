use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::habit::Habit;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to serialize habits: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StorageError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Where the habit snapshot lives between sessions.
///
/// `load_snapshot` hands back raw records; the store sanitizes them.
/// `save_snapshot` always receives the complete habit list.
pub trait Storage {
    fn load_snapshot(&self) -> Result<Vec<Value>, StorageError>;
    fn save_snapshot(&self, habits: &[Habit]) -> Result<(), StorageError>;
}

/// Snapshot kept as a single pretty-printed JSON array on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn corrupt_copy_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".corrupt");
        self.path.with_file_name(name)
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn set_aside_corrupt_file(&self) {
        let target = self.corrupt_copy_path();
        match fs::copy(&self.path, &target) {
            Ok(_) => warn!(path = %target.display(), "kept a copy of the unreadable snapshot"),
            Err(err) => warn!(path = %target.display(), %err, "could not copy unreadable snapshot"),
        }
    }
}

impl Storage for JsonFileStorage {
    fn load_snapshot(&self) -> Result<Vec<Value>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no snapshot yet");
                return Ok(Vec::new());
            }
            Err(err) => return Err(StorageError::io(&self.path, err)),
        };

        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(records)) => Ok(records),
            Ok(other) => {
                warn!(path = %self.path.display(), kind = value_kind(&other), "snapshot is not a list, starting empty");
                self.set_aside_corrupt_file();
                Ok(Vec::new())
            }
            Err(err) => {
                warn!(path = %self.path.display(), %err, "snapshot is not valid JSON, starting empty");
                self.set_aside_corrupt_file();
                Ok(Vec::new())
            }
        }
    }

    fn save_snapshot(&self, habits: &[Habit]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|err| StorageError::io(parent, err))?;
            }
        }
        let payload = serde_json::to_vec_pretty(habits)?;
        let temp = self.temp_path();
        fs::write(&temp, payload).map_err(|err| StorageError::io(&temp, err))?;
        fs::rename(&temp, &self.path).map_err(|err| StorageError::io(&self.path, err))?;
        debug!(path = %self.path.display(), habit_count = habits.len(), "snapshot written");
        Ok(())
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Snapshot held in memory. Clones share the same records, so a caller can
/// keep a handle after giving one to the store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    records: Arc<Mutex<Vec<Value>>>,
    saves: Arc<Mutex<usize>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Value>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            saves: Arc::default(),
        }
    }

    pub fn records(&self) -> Vec<Value> {
        self.records.lock().clone()
    }

    /// Number of completed `save_snapshot` calls.
    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }
}

impl Storage for MemoryStorage {
    fn load_snapshot(&self) -> Result<Vec<Value>, StorageError> {
        Ok(self.records())
    }

    fn save_snapshot(&self, habits: &[Habit]) -> Result<(), StorageError> {
        let records = habits
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        *self.records.lock() = records;
        *self.saves.lock() += 1;
        Ok(())
    }
}
