//! fetchcache - Download remote files once and serve them from disk
//!
//! A small front end over the `FileCache` library for filling, inspecting and
//! clearing the cache directory from a shell.

use clap::Parser;
use std::io;
use std::process::ExitCode;

use fetchcache::cli::{cache_from_cli, run, Cli};
use fetchcache::logging::init_logger;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let cache = match cache_from_cli(&cli) {
        Ok(cache) => cache,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut stdout = io::stdout();
    match run(&cache, &cli.command, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
