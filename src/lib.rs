//! fetchcache library
//!
//! Exposes the file cache for applications, and the CLI and logging modules for
//! the `fetchcache` binary and its integration tests.

pub mod cache;
pub mod cli;
pub mod logging;

pub use cache::{
    CacheConfig, CacheResult, FetchOptions, FileCache, FileCacheError, Fetcher, HttpFetcher,
};
