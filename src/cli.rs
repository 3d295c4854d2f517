// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// There is a single command: everything after the options is a URL to fetch.
// All options are optional, and with none of them we behave like the classic
// fetchall: run every strategy once, no timeout, no concurrency cap.
//
// Options can also come from FETCHALL_* environment variables (or a .env
// file), thanks to clap's `env` feature.
// =============================================================================

use clap::{Parser, ValueEnum};

use crate::fetcher::FetchMode;

#[derive(Parser, Debug)]
#[command(
    name = "fetchall",
    version,
    about = "Fetch URLs and report their times and sizes",
    long_about = "fetchall issues a GET for every URL given on the command line, discards the body \
                  and prints how long each fetch took and how many bytes it returned. \
                  It can fetch one URL at a time or all of them at once, which makes the \
                  difference between sequential and concurrent I/O easy to see."
)]
pub struct Cli {
    /// URLs to fetch (e.g., https://example.com)
    ///
    /// Zero URLs is allowed: you just get the elapsed-time lines.
    pub urls: Vec<String>,

    /// Which fetch strategy to run
    ///
    /// `all` runs buffered, sequential and concurrent back to back.
    #[arg(long, value_enum, default_value_t = Mode::All)]
    pub mode: Mode,

    /// Output results in JSON format instead of plain lines
    #[arg(long)]
    pub json: bool,

    /// Per-request timeout in seconds (default: no timeout)
    #[arg(long, env = "FETCHALL_TIMEOUT", value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Maximum number of URLs fetched at once in concurrent mode
    /// (default: no limit, one task per URL)
    #[arg(long, env = "FETCHALL_MAX_CONCURRENCY", value_name = "N")]
    pub max_concurrency: Option<usize>,
}

/// The `--mode` choices.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Run all three strategies, one section each
    All,
    /// One URL after another
    Sequential,
    /// One URL after another, body read through a buffered reader
    Buffered,
    /// One task per URL, results printed as they finish
    Concurrent,
}

impl Mode {
    /// The strategies this choice expands to, in the order they run.
    pub fn fetch_modes(self) -> Vec<FetchMode> {
        match self {
            Mode::All => vec![
                FetchMode::Buffered,
                FetchMode::Sequential,
                FetchMode::Concurrent,
            ],
            Mode::Sequential => vec![FetchMode::Sequential],
            Mode::Buffered => vec![FetchMode::Buffered],
            Mode::Concurrent => vec![FetchMode::Concurrent],
        }
    }
}
