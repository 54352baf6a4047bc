//! Command-line interface for inspecting and filling the cache
//!
//! This module handles parsing of CLI arguments using clap and runs each
//! subcommand against a `FileCache`.

use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

use crate::cache::{
    CacheConfig, CacheResult, FetchOptions, FileCache, FileCacheError, HttpFetcher,
};

/// Name used for the platform data directory
pub const APP_NAME: &str = "fetchcache";

/// Error types for CLI commands
#[derive(Debug, Error)]
pub enum CliError {
    /// A cache operation failed
    #[error(transparent)]
    Cache(#[from] FileCacheError),

    /// Failed to serialize the entry listing
    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to write command output
    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// fetchcache - Download remote files once and serve them from disk
#[derive(Parser, Debug)]
#[command(name = "fetchcache")]
#[command(about = "Download remote files once and serve them from a local cache")]
#[command(version)]
pub struct Cli {
    /// Use this directory as the data root instead of the platform data directory
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Treat any completed HTTP response as a successful download
    #[arg(long, global = true)]
    pub accept_any_status: bool,

    /// Log cache hits, misses and writes to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the cached path for NAME, downloading URL first if needed
    ///
    /// Examples:
    ///   fetchcache get https://example.com/logo.png logo.png
    ///   fetchcache get https://example.com/motd.txt motd --no-cache
    Get {
        url: String,
        name: String,
        /// Do not write a missed download to disk; print its body instead
        #[arg(long)]
        no_cache: bool,
        /// With --no-cache, still write the download to disk
        #[arg(long, requires = "no_cache")]
        file: bool,
    },
    /// Print whether NAME is cached
    Exists { name: String },
    /// Remove NAME from the cache
    Rm { name: String },
    /// Remove every cached file
    Clear,
    /// List cached files
    Ls {
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the cache directory, or the path NAME is cached at
    Path { name: Option<String> },
}

impl Command {
    /// Fetch options for `get`; `None` for every other command
    pub fn fetch_options(&self) -> Option<FetchOptions> {
        match self {
            Command::Get { no_cache, file, .. } => Some(
                FetchOptions::default()
                    .cache_enabled(!no_cache)
                    .is_file(*file),
            ),
            _ => None,
        }
    }
}

/// Builds the cache configuration from parsed CLI arguments
pub fn config_from_cli(cli: &Cli) -> Result<CacheConfig, FileCacheError> {
    match &cli.root {
        Some(root) => Ok(CacheConfig::with_root(root)),
        None => CacheConfig::from_project_dirs(APP_NAME),
    }
}

/// Builds the HTTP fetcher, applying `--accept-any-status`
pub fn fetcher_from_cli(cli: &Cli) -> HttpFetcher {
    HttpFetcher::new().require_success_status(!cli.accept_any_status)
}

/// Builds the cache the subcommand runs against
pub fn cache_from_cli(cli: &Cli) -> Result<FileCache, FileCacheError> {
    let config = config_from_cli(cli)?;
    Ok(FileCache::with_fetcher(config, fetcher_from_cli(cli)))
}

/// Runs a parsed command against `cache`, writing results to `out`
pub async fn run(
    cache: &FileCache,
    command: &Command,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        Command::Get { url, name, .. } => {
            let options = command.fetch_options().unwrap_or_default();
            match cache.get_or_download(url, name, options).await? {
                CacheResult::File(path) => writeln!(out, "{}", path.display())?,
                CacheResult::Text(text) => write!(out, "{}", text)?,
            }
        }
        Command::Exists { name } => {
            writeln!(out, "{}", cache.exists(name).await?)?;
        }
        Command::Rm { name } => cache.delete(name).await?,
        Command::Clear => match cache.delete_all().await {
            // Nothing cached yet
            Err(e) if e.is_not_found() => {}
            other => other?,
        },
        Command::Ls { json } => {
            let entries = cache.entries().await?;
            if *json {
                writeln!(out, "{}", serde_json::to_string_pretty(&entries)?)?;
            } else {
                for entry in entries {
                    writeln!(
                        out,
                        "{:>10}  {}  {}",
                        entry.size,
                        entry.modified.format("%Y-%m-%d %H:%M:%S"),
                        entry.name
                    )?;
                }
            }
        }
        Command::Path { name } => {
            let path = match name {
                Some(name) => cache.resolve_path(name),
                None => cache.cache_dir().to_path_buf(),
            };
            writeln!(out, "{}", path.display())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("fetchcache").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_parse_get_defaults() {
        let cli = parse(&["get", "http://example.com/a", "a"]);
        assert_eq!(
            cli.command,
            Command::Get {
                url: "http://example.com/a".to_string(),
                name: "a".to_string(),
                no_cache: false,
                file: false,
            }
        );
        assert_eq!(cli.command.fetch_options(), Some(FetchOptions::default()));
    }

    #[test]
    fn test_cli_parse_get_no_cache() {
        let cli = parse(&["get", "http://example.com/a", "a", "--no-cache"]);
        assert_eq!(cli.command.fetch_options(), Some(FetchOptions::transient()));
    }

    #[test]
    fn test_cli_parse_get_no_cache_file() {
        let cli = parse(&["get", "http://example.com/a", "a", "--no-cache", "--file"]);
        let options = cli.command.fetch_options().unwrap();
        assert!(!options.cache_enabled);
        assert!(options.is_file);
        assert!(options.persists());
    }

    #[test]
    fn test_cli_file_requires_no_cache() {
        let args = ["fetchcache", "get", "http://example.com/a", "a", "--file"];
        let result = Cli::try_parse_from(args);
        assert!(result.is_err());
    }

    #[test]
    fn test_fetch_options_none_for_other_commands() {
        assert_eq!(parse(&["clear"]).command.fetch_options(), None);
    }

    #[test]
    fn test_config_from_cli_with_root() {
        let cli = parse(&["--root", "/data/app", "ls"]);
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(config.cache_dir(), PathBuf::from("/data/app/cached_files"));
    }

    #[test]
    fn test_fetcher_from_cli_requires_success_by_default() {
        let cli = parse(&["--root", "/data/app", "ls"]);
        assert!(fetcher_from_cli(&cli).requires_success_status());
    }

    #[test]
    fn test_fetcher_from_cli_accept_any_status() {
        let cli = parse(&["ls", "--root", "/data/app", "--accept-any-status"]);
        assert!(!fetcher_from_cli(&cli).requires_success_status());
    }

    #[test]
    fn test_cache_from_cli_uses_root() {
        let cli = parse(&["--root", "/data/app", "--accept-any-status", "ls"]);
        let cache = cache_from_cli(&cli).unwrap();
        assert_eq!(cache.cache_dir(), Path::new("/data/app/cached_files"));
    }

    #[tokio::test]
    async fn test_run_clear_on_empty_cache_succeeds() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::new(CacheConfig::with_root(temp_dir.path()));
        let mut out = Vec::new();

        run(&cache, &Command::Clear, &mut out).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_run_exists_and_path() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::new(CacheConfig::with_root(temp_dir.path()));
        std::fs::create_dir_all(cache.cache_dir()).unwrap();
        std::fs::write(cache.resolve_path("a"), b"x").unwrap();

        let mut out = Vec::new();
        let exists = Command::Exists {
            name: "a".to_string(),
        };
        let path = Command::Path {
            name: Some("a".to_string()),
        };
        run(&cache, &exists, &mut out).await.unwrap();
        run(&cache, &path, &mut out).await.unwrap();

        let printed = String::from_utf8(out).unwrap();
        let expected_path = cache.resolve_path("a").display().to_string();
        let mut lines = printed.lines();
        assert_eq!(lines.next(), Some("true"));
        assert_eq!(lines.next(), Some(expected_path.as_str()));
    }

    #[tokio::test]
    async fn test_run_ls_json() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FileCache::new(CacheConfig::with_root(temp_dir.path()));
        std::fs::create_dir_all(cache.cache_dir()).unwrap();
        std::fs::write(cache.resolve_path("a.txt"), b"abc").unwrap();

        let mut out = Vec::new();
        run(&cache, &Command::Ls { json: true }, &mut out)
            .await
            .unwrap();

        let listing: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(listing[0]["name"], "a.txt");
        assert_eq!(listing[0]["size"], 3);
    }
}
