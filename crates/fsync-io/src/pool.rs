//! Fixed-size pool of copy workers
//!
//! Workers are spawned once, when the pool is built, and share one
//! multi-consumer channel. The number of workers never exceeds the number of
//! processors on the host. A failed item is logged and recorded but does not
//! stop its worker or affect any other item.

use crate::copy::{copy_file, CopyOptions};
use crossbeam_channel::{unbounded, Receiver, Sender};
use fsync_types::{BufferSize, CopyStats, Error, Result, RetryPolicy, WorkerCount};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Configuration for the copy pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    /// Requested worker count; `None` means one per processor
    pub workers: Option<WorkerCount>,
    /// Chunk size used by every worker
    pub buffer_size: BufferSize,
    /// Source-open retry policy
    pub retry: RetryPolicy,
    /// Sleep between two checks while draining
    pub drain_poll_interval: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: None,
            buffer_size: BufferSize::default(),
            retry: RetryPolicy::default(),
            drain_poll_interval: Duration::from_millis(10),
        }
    }
}

impl PoolConfig {
    /// Number of workers the pool will actually run
    pub fn effective_workers(&self) -> usize {
        let cap = num_cpus::get().max(1);
        self.workers.map_or(cap, |w| w.get().min(cap))
    }
}

/// One pending copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyWorkItem {
    /// File to read
    pub source: PathBuf,
    /// File to create or overwrite
    pub destination: PathBuf,
}

/// A copy that did not complete
#[derive(Debug, Clone)]
pub struct CopyFailure {
    /// The item that failed
    pub item: CopyWorkItem,
    /// Rendered error
    pub message: String,
    /// Whether the error is transient, so a later run may succeed
    pub retryable: bool,
    /// Name of the worker thread that handled it
    pub worker: String,
}

#[derive(Debug, Default)]
struct Shared {
    pending: AtomicUsize,
    active: AtomicUsize,
    peak_active: AtomicUsize,
    stats: Mutex<CopyStats>,
    failures: Mutex<Vec<CopyFailure>>,
}

impl Shared {
    fn begin_item(&self) {
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_active.fetch_max(now_active, Ordering::SeqCst);
    }

    fn end_item(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
        self.pending.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Bounded pool of threads executing copy requests
#[derive(Debug)]
pub struct CopyWorkerPool {
    sender: Option<Sender<CopyWorkItem>>,
    workers: Vec<JoinHandle<()>>,
    shared: Arc<Shared>,
    config: PoolConfig,
    started: Instant,
}

impl CopyWorkerPool {
    /// Resource name used in disposal errors
    pub const RESOURCE_NAME: &'static str = "CopyWorkerPool";

    /// Create a pool with one worker per processor
    pub fn new() -> Result<Self> {
        Self::with_config(PoolConfig::default())
    }

    /// Create a pool and start its workers
    pub fn with_config(config: PoolConfig) -> Result<Self> {
        let (sender, receiver) = unbounded::<CopyWorkItem>();
        let shared = Arc::new(Shared::default());
        let count = config.effective_workers();
        let options = CopyOptions {
            buffer_size: config.buffer_size,
            retry: config.retry,
        };

        let mut workers = Vec::with_capacity(count);
        for id in 0..count {
            let receiver = receiver.clone();
            let shared = Arc::clone(&shared);
            let name = format!("fsync-copy-{}", id);
            let handle = thread::Builder::new()
                .name(name.clone())
                .spawn(move || run_worker(&name, &receiver, &shared, &options))
                .map_err(|e| Error::other(format!("Failed to spawn copy worker: {}", e)))?;
            workers.push(handle);
        }

        debug!("Copy pool started with {} workers", count);
        Ok(Self {
            sender: Some(sender),
            workers,
            shared,
            config,
            started: Instant::now(),
        })
    }

    /// Queue a copy of `source` onto `destination`
    pub fn enqueue<S, D>(&self, source: S, destination: D) -> Result<()>
    where
        S: Into<PathBuf>,
        D: Into<PathBuf>,
    {
        self.enqueue_item(CopyWorkItem {
            source: source.into(),
            destination: destination.into(),
        })
    }

    /// Queue an already built work item
    pub fn enqueue_item(&self, item: CopyWorkItem) -> Result<()> {
        let sender = self
            .sender
            .as_ref()
            .ok_or_else(|| Error::disposed(Self::RESOURCE_NAME))?;

        self.shared.pending.fetch_add(1, Ordering::SeqCst);
        if let Err(e) = sender.send(item) {
            self.shared.pending.fetch_sub(1, Ordering::SeqCst);
            return Err(Error::internal(format!(
                "copy workers are gone, cannot queue '{}'",
                e.into_inner().source.display()
            )));
        }
        Ok(())
    }

    /// Block until every queued and in-flight copy has finished
    pub fn drain(&self) {
        while self.shared.pending.load(Ordering::SeqCst) != 0
            || self.shared.active.load(Ordering::SeqCst) != 0
        {
            thread::sleep(self.config.drain_poll_interval);
        }
    }

    /// Drain, stop the workers and refuse further work
    ///
    /// Calling this again is a no-op.
    pub fn dispose(&mut self) {
        let Some(sender) = self.sender.take() else {
            return;
        };

        self.drain();
        drop(sender);
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                error!("A copy worker panicked");
            }
        }

        let mut stats = self.shared.stats.lock();
        stats.duration = self.started.elapsed();
        info!(
            "Copy pool finished: {} files, {} bytes, {} errors in {:?}",
            stats.files_copied, stats.bytes_copied, stats.errors, stats.duration
        );
    }

    /// Whether [`dispose`](Self::dispose) has run
    pub fn is_disposed(&self) -> bool {
        self.sender.is_none()
    }

    /// Number of worker threads started
    pub fn worker_count(&self) -> usize {
        self.config.effective_workers()
    }

    /// Workers currently copying a file
    pub fn active_workers(&self) -> usize {
        self.shared.active.load(Ordering::SeqCst)
    }

    /// Highest number of workers seen copying at the same time
    pub fn peak_active_workers(&self) -> usize {
        self.shared.peak_active.load(Ordering::SeqCst)
    }

    /// Items queued or in flight
    pub fn pending(&self) -> usize {
        self.shared.pending.load(Ordering::SeqCst)
    }

    /// Snapshot of the copy statistics
    pub fn stats(&self) -> CopyStats {
        self.shared.stats.lock().clone()
    }

    /// Copies that failed so far
    pub fn failures(&self) -> Vec<CopyFailure> {
        self.shared.failures.lock().clone()
    }
}

impl Drop for CopyWorkerPool {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn run_worker(
    name: &str,
    receiver: &Receiver<CopyWorkItem>,
    shared: &Shared,
    options: &CopyOptions,
) {
    let mut buffer = vec![0u8; options.buffer_size.get()];

    while let Ok(item) = receiver.recv() {
        shared.begin_item();

        match copy_file(&item.source, &item.destination, options, &mut buffer) {
            Ok(bytes) => {
                let mut stats = shared.stats.lock();
                stats.files_copied += 1;
                stats.bytes_copied += bytes;
            }
            Err(e) => {
                error!(
                    "[{}] Failed to copy {} to {}: {}",
                    name,
                    item.source.display(),
                    item.destination.display(),
                    e
                );
                shared.stats.lock().errors += 1;
                shared.failures.lock().push(CopyFailure {
                    item,
                    message: e.to_string(),
                    retryable: e.should_retry(),
                    worker: name.to_string(),
                });
            }
        }

        shared.end_item();
    }

    debug!("[{}] Copy worker stopped", name);
}
