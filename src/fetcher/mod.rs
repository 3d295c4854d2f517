// src/fetcher/mod.rs
// =============================================================================
// This module contains all fetching logic.
//
// Submodules:
// - fetch: fetches one URL and counts its body bytes
// - run: drives a list of URLs sequentially, buffered or concurrently
// - report: result types and how they are printed
// - error: what can go wrong with a single fetch
// =============================================================================

mod error;
mod fetch;
mod report;
mod run;

// Re-export the public API so callers can write `fetcher::run_concurrent()`
// instead of `fetcher::run::run_concurrent()`
pub use error::FetchError;
pub use fetch::{fetch, fetch_buffered};
pub use report::{FetchMode, FetchOutcome, FetchReport, RunSummary};
pub use run::{run, run_buffered, run_concurrent, run_sequential};
