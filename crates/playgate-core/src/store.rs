//! Persistent flag storage.
//!
//! Flags are integer-encoded (`1` = true) and default to `0` when absent.
//! `FileFlagStore` keeps them in `<base>/flags.json`.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::paths;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read flags from {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse flags from {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write flags to {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize flags")]
    Serialize(#[from] serde_json::Error),
}

/// Durable integer flags keyed by name.
pub trait FlagStore: Send {
    /// Returns the stored value, or `None` when the key was never written.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be read.
    fn get_int(&self, key: &str) -> Result<Option<i64>, StoreError>;

    /// # Errors
    /// Returns an error if the value cannot be persisted.
    fn set_int(&mut self, key: &str, value: i64) -> Result<(), StoreError>;

    /// # Errors
    /// Returns an error if the removal cannot be persisted.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;

    /// Reads a boolean flag. Absent keys read as `false`.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be read.
    fn get_bool(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get_int(key)?.unwrap_or(0) == 1)
    }

    /// # Errors
    /// Returns an error if the value cannot be persisted.
    fn set_bool(&mut self, key: &str, value: bool) -> Result<(), StoreError> {
        self.set_int(key, i64::from(value))
    }
}

/// JSON file backed store. Every write rewrites the whole file.
#[derive(Debug)]
pub struct FileFlagStore {
    path: PathBuf,
    flags: BTreeMap<String, i64>,
}

impl FileFlagStore {
    /// Opens the store at the default flags path.
    ///
    /// # Errors
    /// Returns an error if an existing flags file cannot be read or parsed.
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(paths::flags_path())
    }

    /// Opens the store at `path`. A missing file is an empty store.
    ///
    /// # Errors
    /// Returns an error if an existing flags file cannot be read or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let flags = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|source| StoreError::Read {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
                path: path.clone(),
                source,
            })?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, flags })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the flags file atomically (temp file + rename).
    fn save(&self) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let contents = serde_json::to_string_pretty(&self.flags)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, contents).map_err(write_err)?;
        fs::rename(&tmp_path, &self.path).map_err(write_err)?;
        Ok(())
    }
}

impl FlagStore for FileFlagStore {
    fn get_int(&self, key: &str) -> Result<Option<i64>, StoreError> {
        Ok(self.flags.get(key).copied())
    }

    fn set_int(&mut self, key: &str, value: i64) -> Result<(), StoreError> {
        self.flags.insert(key.to_string(), value);
        self.save()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.flags.remove(key).is_some() {
            self.save()?;
        }
        Ok(())
    }
}

/// In-process store. Clones share the same flags.
#[derive(Debug, Clone, Default)]
pub struct MemoryFlagStore {
    flags: Arc<Mutex<BTreeMap<String, i64>>>,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flag(key: &str, value: i64) -> Self {
        let store = Self::default();
        store
            .flags
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
        store
    }
}

impl FlagStore for MemoryFlagStore {
    fn get_int(&self, key: &str) -> Result<Option<i64>, StoreError> {
        let flags = self.flags.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(flags.get(key).copied())
    }

    fn set_int(&mut self, key: &str, value: i64) -> Result<(), StoreError> {
        let mut flags = self.flags.lock().unwrap_or_else(PoisonError::into_inner);
        flags.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let mut flags = self.flags.lock().unwrap_or_else(PoisonError::into_inner);
        flags.remove(key);
        Ok(())
    }
}
