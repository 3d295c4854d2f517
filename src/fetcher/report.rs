// src/fetcher/report.rs
// =============================================================================
// Result types produced by the fetch functions.
//
// - FetchReport: what happened to one URL (time, bytes or error text)
// - RunSummary: every report of one run plus the total elapsed time
//
// Both serialize to JSON for the --json flag, and both know how to render
// themselves as the plain text lines the CLI prints.
// =============================================================================

use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;

use super::error::FetchError;

/// Which fetch strategy produced a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    /// One URL after another, body read chunk by chunk
    Sequential,
    /// One URL after another, body drained through a buffered reader
    Buffered,
    /// One task per URL, results collected over a shared channel
    Concurrent,
}

impl fmt::Display for FetchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FetchMode::Sequential => "sequential",
            FetchMode::Buffered => "buffered",
            FetchMode::Concurrent => "concurrent",
        };
        f.write_str(name)
    }
}

/// Outcome of fetching a single URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// The whole body was read; holds the number of bytes discarded
    Fetched { bytes: u64 },
    /// The fetch failed; holds the human readable reason
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchReport {
    pub url: String,
    #[serde(rename = "elapsed_secs", serialize_with = "as_secs")]
    pub elapsed: Duration,
    #[serde(flatten)]
    pub outcome: FetchOutcome,
}

impl FetchReport {
    pub fn fetched(url: impl Into<String>, elapsed: Duration, bytes: u64) -> Self {
        FetchReport {
            url: url.into(),
            elapsed,
            outcome: FetchOutcome::Fetched { bytes },
        }
    }

    pub fn failed(url: impl Into<String>, elapsed: Duration, error: &FetchError) -> Self {
        FetchReport {
            url: url.into(),
            elapsed,
            outcome: FetchOutcome::Failed {
                error: error.to_string(),
            },
        }
    }

    /// True when the body was read to the end.
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, FetchOutcome::Fetched { .. })
    }

    /// Byte count for successful fetches.
    pub fn bytes(&self) -> Option<u64> {
        match self.outcome {
            FetchOutcome::Fetched { bytes } => Some(bytes),
            FetchOutcome::Failed { .. } => None,
        }
    }
}

// Renders the result line printed by the CLI:
//   success: "0.42s     1256  https://example.com"
//   failure: the error text on its own
impl fmt::Display for FetchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            FetchOutcome::Fetched { bytes } => write!(
                f,
                "{:.2}s  {:>7}  {}",
                self.elapsed.as_secs_f64(),
                bytes,
                self.url
            ),
            FetchOutcome::Failed { error } => f.write_str(error),
        }
    }
}

/// Everything one run produced, in the order reports were received.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub mode: FetchMode,
    pub reports: Vec<FetchReport>,
    #[serde(rename = "elapsed_secs", serialize_with = "as_secs")]
    pub elapsed: Duration,
}

impl RunSummary {
    /// The closing line of a run, e.g. "1.37s elapsed".
    pub fn elapsed_line(&self) -> String {
        format!("{:.2}s elapsed", self.elapsed.as_secs_f64())
    }

    pub fn failed_count(&self) -> usize {
        self.reports.iter().filter(|r| !r.is_ok()).count()
    }

    /// Slowest single fetch of the run, zero when there were no URLs.
    pub fn slowest(&self) -> Duration {
        self.reports
            .iter()
            .map(|r| r.elapsed)
            .max()
            .unwrap_or(Duration::ZERO)
    }
}

fn as_secs<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_line_format() {
        let report = FetchReport::fetched("https://example.com", Duration::from_millis(1234), 5678);
        assert_eq!(report.to_string(), "1.23s     5678  https://example.com");
        assert!(report.is_ok());
        assert_eq!(report.bytes(), Some(5678));
    }

    #[test]
    fn test_failure_line_is_error_text() {
        let err = FetchError::body("https://example.com", "unexpected eof");
        let report = FetchReport::failed("https://example.com", Duration::from_millis(10), &err);
        assert_eq!(
            report.to_string(),
            "while reading https://example.com: unexpected eof"
        );
        assert!(!report.is_ok());
        assert_eq!(report.bytes(), None);
    }

    #[test]
    fn test_summary_line_and_slowest() {
        let summary = RunSummary {
            mode: FetchMode::Concurrent,
            reports: vec![
                FetchReport::fetched("a", Duration::from_millis(100), 1),
                FetchReport::fetched("b", Duration::from_millis(300), 2),
            ],
            elapsed: Duration::from_millis(310),
        };
        assert_eq!(summary.elapsed_line(), "0.31s elapsed");
        assert_eq!(summary.slowest(), Duration::from_millis(300));
        assert_eq!(summary.failed_count(), 0);
    }

    #[test]
    fn test_empty_summary() {
        let summary = RunSummary {
            mode: FetchMode::Sequential,
            reports: Vec::new(),
            elapsed: Duration::ZERO,
        };
        assert_eq!(summary.elapsed_line(), "0.00s elapsed");
        assert_eq!(summary.slowest(), Duration::ZERO);
    }

    #[test]
    fn test_report_json_shape() {
        let report = FetchReport::fetched("https://example.com", Duration::from_millis(500), 42);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["url"], "https://example.com");
        assert_eq!(value["status"], "fetched");
        assert_eq!(value["bytes"], 42);
        assert_eq!(value["elapsed_secs"], 0.5);
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(FetchMode::Buffered.to_string(), "buffered");
        assert_eq!(
            serde_json::to_value(FetchMode::Concurrent).unwrap(),
            "concurrent"
        );
    }
}
