//! Cache manager for downloading and keeping remote files on disk
//!
//! Provides a `FileCache` that resolves a caller-chosen file name to a path under
//! the cache directory, serving the existing file when present and downloading it
//! otherwise.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, error};

use super::{CacheConfig, FileCacheError, Fetcher, HttpFetcher};

/// Tracing target every cache failure is logged under
pub const LOG_TARGET: &str = "file_cache";

/// How a cache miss is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Write the download to disk. Defaults to true.
    pub cache_enabled: bool,
    /// When `cache_enabled` is false, still write the download to disk instead
    /// of returning it as text. Defaults to false.
    pub is_file: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            is_file: false,
        }
    }
}

impl FetchOptions {
    /// Options that return a miss as decoded text without touching the disk
    pub fn transient() -> Self {
        Self {
            cache_enabled: false,
            is_file: false,
        }
    }

    pub fn cache_enabled(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    pub fn is_file(mut self, is_file: bool) -> Self {
        self.is_file = is_file;
        self
    }

    /// Whether a miss ends with a file on disk
    pub fn persists(&self) -> bool {
        self.cache_enabled || self.is_file
    }
}

/// Result of `FileCache::get_or_download`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheResult {
    /// A file that exists at the resolved path
    File(PathBuf),
    /// A decoded body that was not written to disk
    Text(String),
}

impl CacheResult {
    /// True if the value is backed by a file on disk
    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::File(_))
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Text(_) => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::File(_) => None,
            Self::Text(text) => Some(text),
        }
    }
}

/// A file currently held in the cache directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CachedEntry {
    /// File name, as passed to `get_or_download`
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Last modification time, i.e. when it was downloaded
    pub modified: DateTime<Utc>,
}

/// Downloads remote files into a single cache directory and serves them from disk
///
/// Entries are keyed only by file name. An existing file is always returned as-is,
/// without checking the remote for changes; two URLs cached under the same name
/// overwrite each other. Concurrent misses for one name are not coordinated and
/// the last write wins.
///
/// Build one at startup and share it; clones refer to the same directory and
/// fetcher.
#[derive(Clone)]
pub struct FileCache {
    /// Directory where cached files are stored
    cache_dir: PathBuf,
    fetcher: Arc<dyn Fetcher>,
}

impl std::fmt::Debug for FileCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileCache")
            .field("cache_dir", &self.cache_dir)
            .finish_non_exhaustive()
    }
}

impl FileCache {
    /// Creates a FileCache that downloads with a default `HttpFetcher`
    ///
    /// Non-2xx responses fail the download; use `with_fetcher` with
    /// `HttpFetcher::require_success_status(false)` to cache them anyway.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_fetcher(config, HttpFetcher::new())
    }

    /// Creates a FileCache that downloads through a custom fetcher
    ///
    /// The fetcher decides how HTTP status codes are treated.
    pub fn with_fetcher(config: CacheConfig, fetcher: impl Fetcher + 'static) -> Self {
        Self {
            cache_dir: config.cache_dir(),
            fetcher: Arc::new(fetcher),
        }
    }

    /// Returns the directory holding the cached files
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path a file named `name` is cached at
    ///
    /// No existence check is made. The caller is responsible for `name` being a
    /// plain file name.
    pub fn resolve_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(name)
    }

    /// Returns the cached file for `name`, downloading it from `url` on a miss
    ///
    /// # Arguments
    /// * `url` - Where to fetch the resource from if it is not cached
    /// * `name` - File name the resource is cached under
    /// * `options` - Whether a miss is written to disk or returned as text
    ///
    /// # Returns
    /// * `Ok(CacheResult::File)` on a hit, or on a miss when `options.persists()`
    /// * `Ok(CacheResult::Text)` on a miss with `FetchOptions::transient()`
    /// * `Err` if the request or the write fails; a partially written file may remain
    pub async fn get_or_download(
        &self,
        url: &str,
        name: &str,
        options: FetchOptions,
    ) -> Result<CacheResult, FileCacheError> {
        self.fetch_or_read(url, name, options)
            .await
            .map_err(report("get_or_download", Some(name)))
    }

    async fn fetch_or_read(
        &self,
        url: &str,
        name: &str,
        options: FetchOptions,
    ) -> Result<CacheResult, FileCacheError> {
        let path = self.resolve_path(name);

        if is_file(&path).await? {
            debug!(target: LOG_TARGET, file = name, "cache hit");
            return Ok(CacheResult::File(path));
        }

        debug!(
            target: LOG_TARGET,
            file = name,
            url,
            persist = options.persists(),
            "cache miss"
        );

        if !options.persists() {
            let text = self.fetcher.fetch_text(url).await?;
            return Ok(CacheResult::Text(text));
        }

        let bytes = self.fetcher.fetch_bytes(url).await?;
        write_file(&path, &bytes).await?;
        debug!(target: LOG_TARGET, file = name, bytes = bytes.len(), "cached download");

        Ok(CacheResult::File(path))
    }

    /// Reports whether a file is cached under `name`
    pub async fn exists(&self, name: &str) -> Result<bool, FileCacheError> {
        is_file(&self.resolve_path(name))
            .await
            .map_err(report("exists", Some(name)))
    }

    /// Removes the file cached under `name`
    ///
    /// Removing a name that was never cached is not an error.
    pub async fn delete(&self, name: &str) -> Result<(), FileCacheError> {
        let path = self.resolve_path(name);
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(target: LOG_TARGET, file = name, "deleted cached file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(report("delete", Some(name))(FileCacheError::io(path, e))),
        }
    }

    /// Removes every entry directly under the cache directory
    ///
    /// Fails with a not-found error if nothing was ever cached and the directory
    /// does not exist; see `FileCacheError::is_not_found`.
    pub async fn delete_all(&self) -> Result<(), FileCacheError> {
        self.remove_entries()
            .await
            .map_err(report("delete_all", None))
    }

    async fn remove_entries(&self) -> Result<(), FileCacheError> {
        let mut dir = fs::read_dir(&self.cache_dir)
            .await
            .map_err(|e| FileCacheError::io(&self.cache_dir, e))?;

        let mut removed = 0usize;
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| FileCacheError::io(&self.cache_dir, e))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| FileCacheError::io(&path, e))?;

            let result = if file_type.is_dir() {
                fs::remove_dir_all(&path).await
            } else {
                fs::remove_file(&path).await
            };
            result.map_err(|e| FileCacheError::io(&path, e))?;
            removed += 1;
        }

        debug!(target: LOG_TARGET, removed, "cleared cache directory");
        Ok(())
    }

    /// Lists the files in the cache directory, sorted by name
    ///
    /// Returns an empty list if the cache directory does not exist yet.
    pub async fn entries(&self) -> Result<Vec<CachedEntry>, FileCacheError> {
        self.list_entries().await.map_err(report("entries", None))
    }

    async fn list_entries(&self) -> Result<Vec<CachedEntry>, FileCacheError> {
        let mut dir = match fs::read_dir(&self.cache_dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(FileCacheError::io(&self.cache_dir, e)),
        };

        let mut entries = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| FileCacheError::io(&self.cache_dir, e))?
        {
            let path = entry.path();
            let metadata = entry
                .metadata()
                .await
                .map_err(|e| FileCacheError::io(&path, e))?;
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata
                .modified()
                .map_err(|e| FileCacheError::io(&path, e))?;

            entries.push(CachedEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                size: metadata.len(),
                modified: DateTime::<Utc>::from(modified),
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

/// Logs a failed cache operation under `LOG_TARGET` and passes the error through
///
/// `name` is the cached file the operation was for, if it targets a single one.
fn report<'a>(
    op: &'static str,
    name: Option<&'a str>,
) -> impl FnOnce(FileCacheError) -> FileCacheError + 'a {
    move |err| {
        match name {
            Some(name) => {
                error!(target: LOG_TARGET, op, file = name, error = %err, "cache operation failed")
            }
            None => error!(target: LOG_TARGET, op, error = %err, "cache operation failed"),
        }
        err
    }
}

async fn is_file(path: &Path) -> Result<bool, FileCacheError> {
    match fs::metadata(path).await {
        Ok(metadata) => Ok(metadata.is_file()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(FileCacheError::io(path, e)),
    }
}

/// Writes `bytes` to `path`, creating the parent directory if missing
async fn write_file(path: &Path, bytes: &[u8]) -> Result<(), FileCacheError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| FileCacheError::io(parent, e))?;
    }
    fs::write(path, bytes)
        .await
        .map_err(|e| FileCacheError::io(path, e))
}
