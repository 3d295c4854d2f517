// src/logging.rs
// =============================================================================
// Sets up the tracing subscriber.
//
// Logs go to stderr so that stdout only ever carries result lines and
// summaries. The level comes from RUST_LOG and defaults to "warn", which
// means a normal run prints one warning per failed URL and nothing else.
// =============================================================================

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "warn";

/// Installs the global subscriber. Call once, early in main.
pub fn init() -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("failed to initialise logging: {}", e))
}
