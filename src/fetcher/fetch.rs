// src/fetcher/fetch.rs
// =============================================================================
// Fetches a single URL and counts the bytes of its body.
//
// Two flavours:
// - fetch: pulls the body chunk by chunk straight off the response
// - fetch_buffered: adapts the body stream into an AsyncRead, wraps it in a
//   BufReader and copies it into a sink
//
// Either way the body is thrown away; only its size and the elapsed time are
// kept. Errors never escape: they become the report for that URL.
//
// Rust concepts:
// - Instant: monotonic clock for measuring elapsed time
// - Streams adapted into readers (tokio_util::io::StreamReader)
// - The ? operator with a custom error enum (FetchError)
// =============================================================================

use futures::TryStreamExt; // gives us .map_err() on streams
use reqwest::{Client, Response};
use std::time::Instant;
use tokio::io::BufReader;
use tokio_util::io::StreamReader;
use tracing::{debug, warn};
use url::Url;

use super::error::FetchError;
use super::report::FetchReport;

/// Capacity of the reader used by `fetch_buffered`.
const BUFFER_SIZE: usize = 32 * 1024;

/// GET `url`, read its body chunk by chunk and report time and size.
pub async fn fetch(client: &Client, url: &str) -> FetchReport {
    let start = Instant::now();
    let result = count_body(client, url).await;
    into_report(url, start, result)
}

/// Same as [`fetch`], but the body is drained through a buffered reader.
pub async fn fetch_buffered(client: &Client, url: &str) -> FetchReport {
    let start = Instant::now();
    let result = count_body_buffered(client, url).await;
    into_report(url, start, result)
}

fn into_report(url: &str, start: Instant, result: Result<u64, FetchError>) -> FetchReport {
    let elapsed = start.elapsed();
    match result {
        Ok(bytes) => {
            debug!(url, bytes, elapsed_ms = elapsed.as_millis() as u64, "fetched");
            FetchReport::fetched(url, elapsed, bytes)
        }
        Err(e) => {
            warn!(url, error = %e, "fetch failed");
            FetchReport::failed(url, elapsed, &e)
        }
    }
}

async fn count_body(client: &Client, url: &str) -> Result<u64, FetchError> {
    // Headers are in; the body hasn't been read yet
    let mut response = send(client, url).await?;

    // Pull one chunk at a time and only keep its length.
    // chunk() returns Ok(None) once the body is complete.
    let mut bytes = 0u64;
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| FetchError::body(url, e))?
    {
        bytes += chunk.len() as u64;
    }

    Ok(bytes)
}

async fn count_body_buffered(client: &Client, url: &str) -> Result<u64, FetchError> {
    let response = send(client, url).await?;

    // Turn the body into a stream of Bytes chunks.
    // StreamReader wants io::Error items, reqwest gives us reqwest::Error
    let stream = response
        .bytes_stream()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e));

    // Stream -> AsyncRead -> buffered AsyncBufRead
    let reader = BufReader::with_capacity(BUFFER_SIZE, StreamReader::new(stream));
    tokio::pin!(reader);

    // Drain everything into a sink; copy_buf returns how many bytes it moved.
    // A broken body shows up here as an io::Error.
    tokio::io::copy_buf(&mut reader, &mut tokio::io::sink())
        .await
        .map_err(|e| FetchError::body(url, e))
}

// Issues the GET. Any HTTP status counts as a response; only transport
// failures are errors here.
async fn send(client: &Client, url: &str) -> Result<Response, FetchError> {
    let parsed = parse_url(url)?;
    debug!(url, "sending request");
    Ok(client.get(parsed).send().await?)
}

fn parse_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported protocol scheme \"{}\"", other),
        }),
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why is a 404 not an error?
//    - We only measure how long the server took and how much it sent
//    - An error page still has a body, so it gets a normal result line
//
// 2. Why tokio::pin!?
//    - copy_buf needs a reader that is Unpin
//    - The stream returned by bytes_stream() makes no such promise
//    - Pinning it on the stack gives us a Pin<&mut _>, which is Unpin
//
// 3. When is the response body released?
//    - The Response (or the reader wrapping it) is dropped when the function
//      returns, on the success path and on every ? early return alike
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_accepts_http_and_https() {
        assert!(parse_url("http://example.com").is_ok());
        assert!(parse_url("https://example.com/path?q=1").is_ok());
    }

    #[test]
    fn test_parse_url_rejects_relative() {
        let err = parse_url("example.com").unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
        assert!(err.to_string().starts_with("invalid URL 'example.com'"));
    }

    #[test]
    fn test_parse_url_rejects_other_schemes() {
        let err = parse_url("ftp://example.com/file").unwrap_err();
        assert!(err.to_string().contains("unsupported protocol scheme \"ftp\""));
    }

    #[tokio::test]
    async fn test_invalid_url_becomes_failed_report() {
        let client = Client::new();
        let report = fetch(&client, "not a url").await;
        assert!(!report.is_ok());
        assert_eq!(report.url, "not a url");
        assert!(report.to_string().contains("invalid URL"));

        let report = fetch_buffered(&client, "mailto:someone@example.com").await;
        assert!(!report.is_ok());
    }
}
