// src/config.rs
// =============================================================================
// Validated run configuration, built from the parsed command line.
//
// The CLI layer only knows about strings and numbers; this is where we reject
// nonsense (a zero timeout, a concurrency cap of zero) and turn the rest into
// the types the fetcher wants.
// =============================================================================

use reqwest::Client;
use std::num::NonZeroUsize;
use std::time::Duration;
use thiserror::Error;

use crate::cli::Cli;
use crate::fetcher::FetchMode;

const USER_AGENT: &str = concat!("fetchall/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("--timeout must be at least 1 second")]
    ZeroTimeout,
    #[error("--max-concurrency must be at least 1")]
    ZeroConcurrency,
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub urls: Vec<String>,
    /// Strategies to run, in order
    pub modes: Vec<FetchMode>,
    pub json: bool,
    pub timeout: Option<Duration>,
    pub max_concurrency: Option<NonZeroUsize>,
}

impl TryFrom<Cli> for FetchConfig {
    type Error = ConfigError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let timeout = match cli.timeout {
            Some(0) => return Err(ConfigError::ZeroTimeout),
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        let max_concurrency = match cli.max_concurrency {
            Some(n) => Some(NonZeroUsize::new(n).ok_or(ConfigError::ZeroConcurrency)?),
            None => None,
        };

        Ok(FetchConfig {
            urls: cli.urls,
            modes: cli.mode.fetch_modes(),
            json: cli.json,
            timeout,
            max_concurrency,
        })
    }
}

impl FetchConfig {
    /// Builds the HTTP client shared by every fetch of every run.
    pub fn client(&self) -> Result<Client, reqwest::Error> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }

    /// True when more than one strategy runs and sections need headings.
    pub fn is_multi_run(&self) -> bool {
        self.modes.len() > 1
    }
}
