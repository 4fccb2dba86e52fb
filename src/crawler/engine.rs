//! The concurrent crawl engine
//!
//! A pool of workers pulls queue items off a bounded MPMC channel, fetches
//! each claimed URL, emits one record on the output stream, and enqueues
//! newly discovered links. Termination is layered: a completion watcher
//! closes the work queue once every enqueued item has been dispositioned,
//! a fan-out task converts external cancellation into a forced-shutdown
//! broadcast, and a close supervisor joins the workers, drains the queue,
//! and closes the output stream exactly once.

use crate::config::CrawlConfig;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::record::{FetchRecord, QueueItem, PARENT_URL_HEADER};
use crate::url::normalize;
use kanal::{AsyncReceiver, AsyncSender};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Hard ceiling on how long the close supervisor waits for in-flight
/// accounting to settle after the queue is drained
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Counts queue items that have been enqueued but not yet dispositioned
///
/// Every `add` pairs with exactly one `done`: the item was processed,
/// dropped by a gate, or drained at shutdown. `wait_zero` is how the
/// supervisors learn that the crawl has settled.
struct InFlight {
    count: AtomicUsize,
    zero: Notify,
}

impl InFlight {
    fn new() -> Self {
        InFlight {
            count: AtomicUsize::new(0),
            zero: Notify::new(),
        }
    }

    fn add(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }

    fn done(&self) {
        if self.count.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.zero.notify_waiters();
        }
    }

    async fn wait_zero(&self) {
        loop {
            // Register before checking so a concurrent final `done` cannot
            // slip between the load and the await.
            let notified = self.zero.notified();
            if self.count.load(Ordering::SeqCst) == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Decrements the in-flight count exactly once when the current item goes
/// out of scope, whichever path drops it
struct InFlightGuard<'a>(&'a InFlight);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.done();
    }
}

/// State shared between workers and supervisors
struct EngineShared {
    config: CrawlConfig,
    fetcher: Fetcher,
    visited: RwLock<HashSet<String>>,
    results_count: AtomicUsize,
    in_flight: InFlight,
    /// Internal broadcast cancelled when the external token fires; unblocks
    /// queue receives and output sends
    forced: CancellationToken,
}

/// The concurrent crawl engine
///
/// One engine runs one crawl. [`spawn_stream`](Self::spawn_stream) starts
/// the worker pool and returns immediately; records arrive on the provided
/// channel until the engine closes it.
pub struct CrawlEngine {
    shared: Arc<EngineShared>,
}

impl CrawlEngine {
    /// Creates an engine for the given configuration
    ///
    /// Fails only when the shared HTTP client cannot be constructed.
    pub fn new(config: CrawlConfig) -> Result<Self, reqwest::Error> {
        let fetcher = Fetcher::new(&config)?;

        Ok(CrawlEngine {
            shared: Arc::new(EngineShared {
                config,
                fetcher,
                visited: RwLock::new(HashSet::new()),
                results_count: AtomicUsize::new(0),
                in_flight: InFlight::new(),
                forced: CancellationToken::new(),
            }),
        })
    }

    /// Number of emission slots claimed so far
    pub fn results_count(&self) -> usize {
        self.shared.results_count.load(Ordering::SeqCst)
    }

    /// Starts the crawl and streams records onto `out`
    ///
    /// Returns immediately after seeding the queue and spawning the worker
    /// pool and its supervisors. The output channel is closed exactly once
    /// when the crawl terminates, whether it ran to completion or was
    /// cancelled through `cancel`. Cancelling after the close is a no-op.
    pub fn spawn_stream(&self, cancel: CancellationToken, out: AsyncSender<FetchRecord>) {
        let shared = Arc::clone(&self.shared);
        let (queue_tx, queue_rx) =
            kanal::bounded_async::<QueueItem>(shared.config.max_pages.saturating_mul(2));

        // The seed is accounted as in-flight before any worker can observe
        // the queue, so the completion watcher cannot fire early.
        shared.in_flight.add();
        let seed = QueueItem {
            url: shared.config.target_url.clone(),
            depth: 0,
            parent: String::new(),
        };
        if !queue_tx.try_send(seed).unwrap_or(false) {
            shared.in_flight.done();
        }

        let mut workers = Vec::with_capacity(shared.config.workers);
        for id in 0..shared.config.workers {
            workers.push(tokio::spawn(worker_loop(
                id,
                Arc::clone(&shared),
                queue_rx.clone(),
                queue_tx.clone(),
                out.clone(),
                cancel.clone(),
            )));
        }

        // Forced-shutdown fan-out.
        {
            let shared = Arc::clone(&shared);
            let cancel = cancel.clone();
            tokio::spawn(async move {
                cancel.cancelled().await;
                tracing::debug!("cancellation received, forcing shutdown");
                shared.forced.cancel();
            });
        }

        // Completion watcher: a quiescent crawl (no queued or in-progress
        // items left) closes the queue so idle workers drain out without
        // waiting for a cancellation source.
        {
            let shared = Arc::clone(&shared);
            let queue_tx = queue_tx.clone();
            tokio::spawn(async move {
                shared.in_flight.wait_zero().await;
                queue_tx.close();
            });
        }

        tokio::spawn(close_supervisor(shared, workers, queue_rx, out));
    }
}

/// One worker: pulls items until cancellation, forced shutdown, or queue
/// close, processing each under an in-flight guard
async fn worker_loop(
    id: usize,
    shared: Arc<EngineShared>,
    queue_rx: AsyncReceiver<QueueItem>,
    queue_tx: AsyncSender<QueueItem>,
    out: AsyncSender<FetchRecord>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::trace!(worker = id, "context cancelled, exiting");
                return;
            }
            _ = shared.forced.cancelled() => {
                tracing::trace!(worker = id, "forced shutdown, exiting");
                return;
            }
            item = queue_rx.recv() => {
                match item {
                    Ok(item) => process_item(id, &shared, item, &queue_tx, &out, &cancel).await,
                    // Queue closed: the crawl has settled.
                    Err(_) => return,
                }
            }
        }
    }
}

/// Processes one claimed queue item through the gates: depth, visited,
/// fetch, results cap, emission, child enqueue
///
/// The guard guarantees exactly one in-flight decrement for the item no
/// matter which gate drops it.
async fn process_item(
    id: usize,
    shared: &EngineShared,
    item: QueueItem,
    queue_tx: &AsyncSender<QueueItem>,
    out: &AsyncSender<FetchRecord>,
    cancel: &CancellationToken,
) {
    let _guard = InFlightGuard(&shared.in_flight);

    tracing::trace!(worker = id, url = %item.url, depth = item.depth, "processing");

    if item.depth > shared.config.max_depth {
        return;
    }

    let key = normalize(&item.url).to_string();
    if shared.visited.read().await.contains(&key) {
        return;
    }
    // Claim under the write lock; losing the insert race drops the item,
    // so a URL is fetched and emitted at most once.
    if !shared.visited.write().await.insert(key) {
        return;
    }

    let mut record = shared.fetcher.fetch_page(cancel, &item.url).await;
    record.depth = item.depth;
    record
        .headers
        .insert(PARENT_URL_HEADER.to_string(), item.parent.clone());

    // The counter is monotonic: once it passes the cap, this worker and
    // every later one drop their records without emitting.
    let emitted = shared.results_count.fetch_add(1, Ordering::SeqCst) + 1;
    if emitted > shared.config.max_pages {
        return;
    }

    tracing::debug!(
        worker = id,
        url = %item.url,
        status = record.status,
        depth = item.depth,
        total = emitted,
        limit = shared.config.max_pages,
        "crawled"
    );

    // Only same-site links feed the queue; cross-site links are reported in
    // the record but never fetched.
    let children = record.internal_links.clone();

    tokio::select! {
        _ = cancel.cancelled() => return,
        _ = shared.forced.cancelled() => return,
        sent = out.send(record) => {
            if sent.is_err() {
                return;
            }
        }
    }

    if shared.results_count.load(Ordering::SeqCst) >= shared.config.max_pages
        || item.depth >= shared.config.max_depth
    {
        return;
    }

    for link in children {
        if shared.visited.read().await.contains(normalize(&link)) {
            continue;
        }

        shared.in_flight.add();
        if cancel.is_cancelled() || shared.forced.is_cancelled() {
            // The send was pre-empted by shutdown; undo the add.
            shared.in_flight.done();
            return;
        }

        let child = QueueItem {
            url: link.clone(),
            depth: item.depth + 1,
            parent: item.url.clone(),
        };
        match queue_tx.try_send(child) {
            Ok(true) => {
                tracing::trace!(worker = id, url = %link, depth = item.depth + 1, "enqueued");
            }
            Ok(false) => {
                tracing::warn!(url = %link, "work queue full, dropping link");
                shared.in_flight.done();
            }
            Err(_) => {
                // Queue already closed by shutdown.
                shared.in_flight.done();
                return;
            }
        }
    }
}

/// Joins the worker pool, settles in-flight accounting, and closes the
/// output stream exactly once
async fn close_supervisor(
    shared: Arc<EngineShared>,
    workers: Vec<JoinHandle<()>>,
    queue_rx: AsyncReceiver<QueueItem>,
    out: AsyncSender<FetchRecord>,
) {
    for worker in workers {
        let _ = worker.await;
    }
    tracing::debug!("all workers exited, draining queue");

    let mut drained = 0usize;
    while let Ok(Some(_)) = queue_rx.try_recv() {
        shared.in_flight.done();
        drained += 1;
    }
    if drained > 0 {
        tracing::debug!(drained, "dropped undispatched queue items");
    }

    if tokio::time::timeout(SHUTDOWN_GRACE, shared.in_flight.wait_zero())
        .await
        .is_err()
    {
        tracing::error!(
            "in-flight accounting did not settle within {:?}, forcing exit",
            SHUTDOWN_GRACE
        );
        std::process::exit(2);
    }

    // kanal's close is idempotent: the first call transitions the channel
    // and any late send fails on the sender side.
    out.close();
    tracing::debug!("output stream closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_flight_starts_settled() {
        let in_flight = InFlight::new();
        in_flight.wait_zero().await;
    }

    #[tokio::test]
    async fn test_in_flight_wait_blocks_until_done() {
        let in_flight = Arc::new(InFlight::new());
        in_flight.add();
        in_flight.add();

        let waiter = {
            let in_flight = Arc::clone(&in_flight);
            tokio::spawn(async move { in_flight.wait_zero().await })
        };

        in_flight.done();
        assert!(!waiter.is_finished());

        in_flight.done();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should settle once the count reaches zero")
            .unwrap();
    }

    #[tokio::test]
    async fn test_guard_decrements_on_drop() {
        let in_flight = InFlight::new();
        in_flight.add();
        {
            let _guard = InFlightGuard(&in_flight);
        }
        in_flight.wait_zero().await;
    }

    #[tokio::test]
    async fn test_guard_decrements_exactly_once() {
        let in_flight = InFlight::new();
        in_flight.add();
        in_flight.add();
        {
            let _guard = InFlightGuard(&in_flight);
        }
        assert_eq!(in_flight.count.load(Ordering::SeqCst), 1);
    }
}
