//! Fetch a list of URLs and report, per URL, how long it took and how many
//! bytes came back.
//!
//! The same list can be fetched three ways: strictly one after another,
//! one after another through a buffered reader, or all at once with one task
//! per URL feeding a shared channel.

pub mod cli;
pub mod config;
pub mod fetcher;
pub mod logging;
