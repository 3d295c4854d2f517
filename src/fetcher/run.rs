// src/fetcher/run.rs
// =============================================================================
// Runs a whole list of URLs through one of the fetch strategies.
//
// - run_sequential / run_buffered: one URL at a time, in input order
// - run_concurrent: fan-out/fan-in. One tokio task per URL, every task sends
//   its report into a shared channel, and we receive exactly one message per
//   URL. Reports come back in completion order, not input order.
//
// Every runner calls `on_report` as soon as a report is available, so the CLI
// can print each line right away, and returns a RunSummary at the end.
// =============================================================================

use futures::FutureExt; // gives us .catch_unwind() on futures
use reqwest::Client;
use std::future::Future;
use std::num::NonZeroUsize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Semaphore};
use tracing::{info, warn};

use super::error::FetchError;
use super::fetch::{fetch, fetch_buffered};
use super::report::{FetchMode, FetchReport, RunSummary};

/// Runs `urls` with the given strategy.
///
/// `max_concurrency` only matters for [`FetchMode::Concurrent`]; `None` means
/// one in-flight task per URL with no cap.
pub async fn run<F>(
    mode: FetchMode,
    client: &Client,
    urls: &[String],
    max_concurrency: Option<NonZeroUsize>,
    on_report: F,
) -> RunSummary
where
    F: FnMut(&FetchReport),
{
    match mode {
        FetchMode::Sequential => run_sequential(client, urls, on_report).await,
        FetchMode::Buffered => run_buffered(client, urls, on_report).await,
        FetchMode::Concurrent => run_concurrent(client, urls, max_concurrency, on_report).await,
    }
}

pub async fn run_sequential<F>(client: &Client, urls: &[String], on_report: F) -> RunSummary
where
    F: FnMut(&FetchReport),
{
    run_in_order(InOrder::Plain, client, urls, on_report).await
}

pub async fn run_buffered<F>(client: &Client, urls: &[String], on_report: F) -> RunSummary
where
    F: FnMut(&FetchReport),
{
    run_in_order(InOrder::Buffered, client, urls, on_report).await
}

// The strategies that fetch one URL at a time. Concurrent has its own runner,
// so it has no variant here.
#[derive(Debug, Clone, Copy)]
enum InOrder {
    Plain,
    Buffered,
}

impl InOrder {
    fn mode(self) -> FetchMode {
        match self {
            InOrder::Plain => FetchMode::Sequential,
            InOrder::Buffered => FetchMode::Buffered,
        }
    }
}

async fn run_in_order<F>(
    strategy: InOrder,
    client: &Client,
    urls: &[String],
    mut on_report: F,
) -> RunSummary
where
    F: FnMut(&FetchReport),
{
    let mode = strategy.mode();
    info!(%mode, count = urls.len(), "starting run");
    let start = Instant::now();
    let mut reports = Vec::with_capacity(urls.len());

    for url in urls {
        // Wait for this URL to finish before starting the next one
        let report = match strategy {
            InOrder::Plain => fetch(client, url).await,
            InOrder::Buffered => fetch_buffered(client, url).await,
        };

        // Hand the line out right away, then keep it for the summary
        on_report(&report);
        reports.push(report);
    }

    finish(mode, reports, start.elapsed())
}

/// Fetches every URL in its own task and collects the reports as they finish.
///
/// The receive loop runs exactly `urls.len()` times. A task that panics still
/// reports, with a [`FetchError::TaskFailed`] line, so the count always holds.
pub async fn run_concurrent<F>(
    client: &Client,
    urls: &[String],
    max_concurrency: Option<NonZeroUsize>,
    on_report: F,
) -> RunSummary
where
    F: FnMut(&FetchReport),
{
    info!(
        mode = %FetchMode::Concurrent,
        count = urls.len(),
        max_concurrency = max_concurrency.map(NonZeroUsize::get),
        "starting run"
    );
    let start = Instant::now();

    // Capacity 1: each sender waits until the receiver has room, which is as
    // close to a rendezvous channel as tokio's mpsc gets.
    let (tx, rx) = mpsc::channel::<FetchReport>(1);

    // One shared semaphore when a cap is set, nothing otherwise
    let permits = max_concurrency.map(|n| Arc::new(Semaphore::new(n.get())));

    // Fan out: one task per URL, each owning its own clone of the client
    for url in urls {
        let client = client.clone();
        let target = url.clone();
        let fetch_one = async move { fetch(&client, &target).await };

        spawn_report(tx.clone(), url.clone(), permits.clone(), fetch_one);
    }

    // Drop our own sender so recv() returns None if every task is gone.
    drop(tx);

    // Fan in: exactly one receive per URL, in completion order
    let reports = collect_reports(rx, urls.len(), on_report).await;

    finish(FetchMode::Concurrent, reports, start.elapsed())
}

// Spawns one fetch unit. The task waits for a permit (if there is a cap),
// runs `fetch_one`, and sends exactly one report for `url`, even when
// `fetch_one` panics.
fn spawn_report<Fut>(
    tx: mpsc::Sender<FetchReport>,
    url: String,
    permits: Option<Arc<Semaphore>>,
    fetch_one: Fut,
) where
    Fut: Future<Output = FetchReport> + Send + 'static,
{
    tokio::spawn(async move {
        // Held until the report is sent; None when there is no cap.
        let _permit = match permits {
            Some(semaphore) => semaphore.acquire_owned().await.ok(),
            None => None,
        };

        // Timing starts once we hold a permit, so queueing isn't charged
        let task_start = Instant::now();
        let report = match AssertUnwindSafe(fetch_one).catch_unwind().await {
            Ok(report) => report,
            Err(panic) => {
                // Turn the panic into an ordinary error line for this URL
                let error = FetchError::TaskFailed {
                    url: url.clone(),
                    reason: panic_message(panic.as_ref()),
                };
                warn!(url = %url, error = %error, "fetch task panicked");
                FetchReport::failed(url, task_start.elapsed(), &error)
            }
        };

        // The receiver only goes away if the caller stopped listening.
        let _ = tx.send(report).await;
    });
}

// Receives `expected` reports, calling `on_report` for each as it arrives.
async fn collect_reports<F>(
    mut rx: mpsc::Receiver<FetchReport>,
    expected: usize,
    mut on_report: F,
) -> Vec<FetchReport>
where
    F: FnMut(&FetchReport),
{
    let mut reports = Vec::with_capacity(expected);
    for _ in 0..expected {
        match rx.recv().await {
            Some(report) => {
                on_report(&report);
                reports.push(report);
            }
            // Every sender is gone; only possible if a task was aborted
            None => {
                warn!(
                    expected,
                    received = reports.len(),
                    "channel closed before every URL reported"
                );
                break;
            }
        }
    }
    reports
}

fn finish(mode: FetchMode, reports: Vec<FetchReport>, elapsed: Duration) -> RunSummary {
    let summary = RunSummary {
        mode,
        reports,
        elapsed,
    };
    info!(
        %mode,
        fetched = summary.reports.len() - summary.failed_count(),
        failed = summary.failed_count(),
        elapsed_ms = elapsed.as_millis() as u64,
        "run finished"
    );
    summary
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked".to_string()
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why clone the client for every task?
//    - tokio::spawn needs 'static futures, so each task must own its data
//    - Client is an Arc internally, so cloning it is just a refcount bump
//      and all tasks share one connection pool
//
// 2. Why count receives instead of waiting for the channel to close?
//    - We know exactly how many reports to expect: one per URL
//    - The None branch only exists so a bug can't hang the program forever
//
// 3. What does the semaphore do?
//    - Nothing unless --max-concurrency is set
//    - With a cap of N, at most N tasks are inside fetch() at once; the rest
//      are spawned but wait for a permit
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_zero_urls_produce_no_reports() {
        let client = Client::new();
        for mode in [FetchMode::Sequential, FetchMode::Buffered, FetchMode::Concurrent] {
            let mut seen = 0;
            let summary = run(mode, &client, &[], None, |_| seen += 1).await;
            assert_eq!(seen, 0);
            assert!(summary.reports.is_empty());
            assert_eq!(summary.mode, mode);
            assert!(summary.elapsed < Duration::from_secs(1));
        }
    }

    #[tokio::test]
    async fn test_invalid_urls_still_report_once_each() {
        let client = Client::new();
        let urls = vec!["bogus".to_string(), "also bogus".to_string()];
        let mut lines = Vec::new();
        let summary = run_concurrent(&client, &urls, NonZeroUsize::new(1), |r| {
            lines.push(r.to_string())
        })
        .await;
        assert_eq!(lines.len(), 2);
        assert_eq!(summary.failed_count(), 2);
        assert!(lines.iter().all(|l| l.contains("invalid URL")));
    }

    async fn explode() -> FetchReport {
        panic!("boom")
    }

    #[tokio::test]
    async fn test_panicking_task_still_reports() {
        let (tx, rx) = mpsc::channel(1);
        let ok_url = "http://ok.invalid/".to_string();
        let bad_url = "http://bad.invalid/".to_string();

        let ok_report = FetchReport::fetched(ok_url.clone(), Duration::from_millis(5), 3);
        spawn_report(tx.clone(), ok_url.clone(), None, async move { ok_report });
        spawn_report(tx.clone(), bad_url.clone(), None, explode());
        spawn_report(
            tx.clone(),
            ok_url.clone(),
            Some(Arc::new(Semaphore::new(1))),
            async { FetchReport::fetched("http://ok.invalid/", Duration::ZERO, 7) },
        );
        drop(tx);

        let mut lines = Vec::new();
        let reports = collect_reports(rx, 3, |r| lines.push(r.to_string())).await;

        assert_eq!(reports.len(), 3);
        assert_eq!(lines.len(), 3);
        let failed: Vec<&FetchReport> = reports.iter().filter(|r| !r.is_ok()).collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].url, bad_url);
        assert_eq!(
            failed[0].to_string(),
            "fetch task for http://bad.invalid/ failed: boom"
        );
    }

    #[tokio::test]
    async fn test_collect_stops_when_senders_are_gone() {
        let (tx, rx) = mpsc::channel(1);
        spawn_report(tx.clone(), "http://only.invalid/".to_string(), None, async {
            FetchReport::fetched("http://only.invalid/", Duration::ZERO, 1)
        });
        drop(tx);

        // Asking for more than was sent must not hang
        let reports = collect_reports(rx, 2, |_| {}).await;
        assert_eq!(reports.len(), 1);
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(boxed.as_ref()), "task panicked");
    }
}
