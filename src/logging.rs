//! Log output for the `fetchcache` binary

use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "warn";

/// Initialize the logging system
///
/// Reads the filter from `RUST_LOG`, falling back to `warn`; `verbose` raises the
/// cache's own target to `debug`. Logs go to stderr so stdout stays clean for
/// command output.
pub fn init_logger(verbose: bool) {
    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    if verbose {
        if let Ok(directive) = format!("{}=debug", crate::cache::LOG_TARGET).parse() {
            filter = filter.add_directive(directive);
        }
    }

    // Ignore the error if a subscriber is already installed
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .compact(),
        )
        .try_init();
}
