//! Key-value storage backends
//!
//! [`MemoryStorage`] lives as long as the process. [`FileStorage`] keeps a
//! JSON object on disk and rewrites it on every `set`, so state survives a
//! restart of the process the same way extension storage survives a
//! suspended background.

use crate::error::{PlatformError, Result};
use parking_lot::{Mutex, RwLock};
use sdc_core::KeyValueStore;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// In-process storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryStorage {
    /// Create empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    /// Check if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get(&self, key: &str) -> sdc_core::Result<Option<Value>> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> sdc_core::Result<()> {
        self.values.write().insert(key.to_string(), value);
        Ok(())
    }
}

/// Storage persisted to a JSON file
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    values: Mutex<Map<String, Value>>,
}

impl FileStorage {
    /// Open a state file, starting empty if it does not exist yet
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let values = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => Map::new(),
            Ok(content) => match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    return Err(PlatformError::CorruptState {
                        path: path.display().to_string(),
                        message: "expected a JSON object".to_string(),
                    })
                }
                Err(e) => {
                    return Err(PlatformError::CorruptState {
                        path: path.display().to_string(),
                        message: e.to_string(),
                    })
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(source) => {
                return Err(PlatformError::StateFile {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        debug!(path = %path.display(), keys = values.len(), "Opened state file");
        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    /// Path of the state file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, values: &Map<String, Value>) -> Result<()> {
        let state_file_error = |source| PlatformError::StateFile {
            path: self.path.display().to_string(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(state_file_error)?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        let mut file = std::fs::File::create(&tmp_path).map_err(state_file_error)?;
        serde_json::to_writer_pretty(&mut file, values)?;
        file.write_all(b"\n").map_err(state_file_error)?;
        file.sync_all().map_err(state_file_error)?;
        drop(file);

        // Atomic rename
        std::fs::rename(&tmp_path, &self.path).map_err(state_file_error)?;
        trace!(path = %self.path.display(), "State file written");
        Ok(())
    }
}

impl KeyValueStore for FileStorage {
    fn get(&self, key: &str) -> sdc_core::Result<Option<Value>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> sdc_core::Result<()> {
        let mut values = self.values.lock();
        let previous = values.insert(key.to_string(), value);

        if let Err(e) = self.flush(&values) {
            // keep memory and disk in agreement
            match previous {
                Some(previous) => values.insert(key.to_string(), previous),
                None => values.remove(key),
            };
            return Err(e.into());
        }
        Ok(())
    }
}
