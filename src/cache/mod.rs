//! Disk cache for remotely fetched files
//!
//! This module provides a `FileCache` that maps caller-chosen file names to files
//! under a single cache directory. A missing entry is downloaded on first request
//! and kept on disk until deleted; there is no expiry or freshness check.

mod config;
mod error;
mod fetcher;
mod manager;

pub use config::{CacheConfig, DEFAULT_FOLDER};
pub use error::FileCacheError;
pub use fetcher::{Fetcher, HttpFetcher};
pub use manager::{CacheResult, CachedEntry, FetchOptions, FileCache, LOG_TARGET};
