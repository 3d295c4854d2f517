// src/fetcher/error.rs
// =============================================================================
// Error types for a single fetch.
//
// Every variant ends up as the text of a result line; nothing here is ever
// escalated to the caller as a hard failure.
// =============================================================================

use thiserror::Error;

/// Why fetching one URL did not produce a byte count.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The argument is not an absolute http(s) URL.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Connection or transport failure before a response arrived.
    #[error(transparent)]
    Request(#[from] reqwest::Error),

    /// The response started but the body could not be read to the end.
    #[error("while reading {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },

    /// The concurrent task for this URL died before reporting.
    #[error("fetch task for {url} failed: {reason}")]
    TaskFailed { url: String, reason: String },
}

impl FetchError {
    pub(crate) fn body<E>(url: &str, error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        FetchError::Body {
            url: url.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_error_names_the_url() {
        let err = FetchError::body("https://example.com", "connection reset");
        assert_eq!(
            err.to_string(),
            "while reading https://example.com: connection reset"
        );
    }

    #[test]
    fn test_invalid_url_message() {
        let err = FetchError::InvalidUrl {
            url: "nope".to_string(),
            reason: "relative URL without a base".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid URL 'nope': relative URL without a base"
        );
    }
}
