//! Cache manager for persisting API payloads to disk
//!
//! Provides a `CacheManager` that stores raw response bytes in one JSON file per
//! cache key. Writes go through a temporary sibling file that is renamed into
//! place, so a reader sees either the previous payload or the new one.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// Manages reading and writing cached payloads to disk
///
/// Payloads are stored verbatim as `<cache_dir>/<key>.json`. Keys are either a
/// fixed name (e.g. `beststories`) or a numeric item id.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Creates a new CacheManager rooted at `cache_dir`
    pub fn with_dir(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Returns the path to a cache file for the given key
    pub fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }

    /// Replaces the cached payload for `key`
    ///
    /// # Arguments
    /// * `key` - Cache key (e.g. `"beststories"` or `"8863"`)
    /// * `payload` - The exact bytes returned by the upstream API
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err` if directory creation or file writing fails
    pub fn write(&self, key: &str, payload: &[u8]) -> io::Result<()> {
        self.ensure_dir()?;
        write_atomic(&self.cache_path(key), payload)
    }

    /// Reads the cached payload for `key`
    ///
    /// Returns `None` if the entry doesn't exist. Any other I/O error is logged
    /// and also reported as `None`, since callers only need to know whether a
    /// usable payload is available.
    pub fn read(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.cache_path(key);
        match fs::read(&path) {
            Ok(payload) => Some(payload),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable cache file");
                None
            }
        }
    }
}

/// Writes `contents` to `path` by way of a temporary file in the same directory
///
/// The rename is atomic on the same filesystem, so readers never observe a
/// partially written file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut tmp_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(ErrorKind::InvalidInput, "path has no file name"))?
        .to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    if let Err(e) = fs::write(&tmp_path, contents) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    fs::rename(&tmp_path, path).inspect_err(|_| {
        let _ = fs::remove_file(&tmp_path);
    })
}
