//! Location of a `FileCache` on disk

use directories::ProjectDirs;
use std::path::{Path, PathBuf};

use super::FileCacheError;

/// Name of the directory holding cached files, nested under the data root
pub const DEFAULT_FOLDER: &str = "cached_files";

/// Settings a `FileCache` is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Application-private storage root
    pub data_root: PathBuf,
    /// Folder under `data_root` that holds the cached files
    pub folder: String,
}

impl CacheConfig {
    /// Creates a config rooted at the platform data directory for `app_name`
    ///
    /// Uses `~/.local/share/<app_name>/` on Linux, or the equivalent path on other
    /// platforms. Fails with `FileCacheError::NoDataRoot` if no home directory is set.
    pub fn from_project_dirs(app_name: &str) -> Result<Self, FileCacheError> {
        let project_dirs =
            ProjectDirs::from("", "", app_name).ok_or(FileCacheError::NoDataRoot)?;
        Ok(Self::with_root(project_dirs.data_dir()))
    }

    /// Creates a config rooted at a custom directory
    ///
    /// Useful for testing or when a specific location is needed.
    pub fn with_root(data_root: impl AsRef<Path>) -> Self {
        Self {
            data_root: data_root.as_ref().to_path_buf(),
            folder: DEFAULT_FOLDER.to_string(),
        }
    }

    /// Directory holding the cached files
    pub fn cache_dir(&self) -> PathBuf {
        self.data_root.join(&self.folder)
    }
}
