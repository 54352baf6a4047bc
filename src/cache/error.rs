use std::io;
use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while reading, downloading or removing cached files
#[derive(Debug, Error)]
pub enum FileCacheError {
    /// The platform data directory could not be determined (e.g., no home directory)
    #[error("Could not determine the application data directory")]
    NoDataRoot,

    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Unexpected HTTP status {status} from {url}")]
    Status { url: String, status: StatusCode },

    /// Filesystem operation failed
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FileCacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns true if this is a filesystem error for a path that does not exist
    ///
    /// `FileCache::delete_all` fails this way when nothing has been cached yet.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}
