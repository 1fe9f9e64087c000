//! Persisted key-value cache backing offline operation.
//!
//! Each dataset is one JSON file under the cache directory. Reads for absent
//! keys are not errors; callers get the documented default instead.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;
use std::path::PathBuf;

/// Errors raised when the cache itself cannot be read or written.
#[derive(Debug)]
pub enum CacheError {
    /// I/O error reading or writing a cache file.
    Io(PathBuf, io::Error),
    /// A cache file holds JSON that does not match the requested type.
    Parse(PathBuf, serde_json::Error),
}

impl std::fmt::Display for CacheError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheError::Io(path, e) => write!(f, "cache I/O error for {}: {}", path.display(), e),
            CacheError::Parse(path, e) => {
                write!(f, "cache file {} is not valid: {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Io(_, e) => Some(e),
            CacheError::Parse(_, e) => Some(e),
        }
    }
}

/// Directory-backed cache, one `<key>.json` file per dataset.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Full path of the file backing `key`.
    pub fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    /// Reads `key`, returning `Ok(None)` when the file does not exist.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        let path = self.path(key);
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CacheError::Io(path, e)),
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| CacheError::Parse(path, e))
    }

    /// Reads `key`, falling back to the type's default when the key is
    /// absent or its file is unreadable. An unreadable file is logged and
    /// treated as absent rather than failing the caller.
    pub fn read_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.read(key) {
            Ok(Some(value)) => value,
            Ok(None) => T::default(),
            Err(e) => {
                tracing::warn!("discarding unreadable cache entry '{}': {}", key, e);
                T::default()
            }
        }
    }

    /// Overwrites `key` with `value`. Creates the cache directory on first
    /// use. Last writer wins.
    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| CacheError::Io(self.dir.clone(), e))?;

        let path = self.path(key);
        let contents =
            serde_json::to_string_pretty(value).map_err(|e| CacheError::Parse(path.clone(), e))?;
        std::fs::write(&path, contents).map_err(|e| CacheError::Io(path, e))
    }

    /// Removes `key`. Removing an absent key is not an error.
    pub fn remove(&self, key: &str) -> Result<(), CacheError> {
        let path = self.path(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::Io(path, e)),
        }
    }
}
