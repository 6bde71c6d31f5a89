//! Bounded task scheduler
//!
//! This module handles:
//! - An unbounded backlog of submitted tasks
//! - A capped number of concurrently running tasks (via a semaphore)
//! - Fan-out: running tasks may submit more tasks
//! - Quiescence detection: the run ends once no task is queued or running
//!
//! Quiescence is tracked with a single outstanding-task counter that is
//! incremented on submit and decremented when a task finishes. A task's own
//! submissions happen before its decrement, so the counter can only reach
//! zero once nothing queued or running can add more work.

use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify, Semaphore};
use tokio::task::JoinSet;

const MIB: u64 = 1024 * 1024;

/// Concurrency cap derived from the machine
///
/// `min(cores * 10, available memory / 1 MiB)`: the memory term bounds
/// worst-case per-task buffering, the CPU term bounds context switching.
/// When available memory cannot be determined only the CPU term applies.
pub fn default_max_concurrency() -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    let cpu_bound = cores * 10;

    let limit = match available_memory_bytes() {
        Some(bytes) => cpu_bound.min((bytes / MIB) as usize),
        None => cpu_bound,
    };

    limit.max(1)
}

fn available_memory_bytes() -> Option<u64> {
    let meminfo = std::fs::read_to_string("/proc/meminfo").ok()?;
    parse_available_memory(&meminfo)
}

/// Reads `MemAvailable` (or `MemFree` on kernels without it) from /proc/meminfo
fn parse_available_memory(meminfo: &str) -> Option<u64> {
    let field = |name: &str| {
        meminfo.lines().find_map(|line| {
            let value = line.strip_prefix(name)?.strip_prefix(':')?;
            let kib = value.trim().strip_suffix("kB")?.trim().parse::<u64>().ok()?;
            Some(kib * 1024)
        })
    };

    field("MemAvailable").or_else(|| field("MemFree"))
}

#[derive(Debug, Default)]
struct Shared {
    /// Submitted tasks that have not finished yet (queued or running)
    outstanding: AtomicUsize,
    in_flight: AtomicUsize,
    completed: AtomicU64,
    quiescent: Notify,
}

impl Shared {
    fn release(&self) {
        if self.outstanding.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.quiescent.notify_one();
        }
    }
}

/// Marks a task finished when dropped, including when the task panics
struct Completion(Arc<Shared>);

impl Drop for Completion {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::AcqRel);
        self.0.completed.fetch_add(1, Ordering::Relaxed);
        self.0.release();
    }
}

/// Cloneable handle for submitting tasks, handed to every running task
pub struct SchedulerHandle<T> {
    sender: mpsc::UnboundedSender<T>,
    shared: Arc<Shared>,
}

impl<T> Clone for SchedulerHandle<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> SchedulerHandle<T> {
    /// Adds a task to the backlog
    pub fn submit(&self, task: T) {
        self.shared.outstanding.fetch_add(1, Ordering::AcqRel);

        if self.sender.send(task).is_err() {
            // The scheduler is gone; nothing will ever run this task
            self.shared.release();
        }
    }

    /// Tasks submitted but not yet finished
    pub fn outstanding(&self) -> usize {
        self.shared.outstanding.load(Ordering::Acquire)
    }

    /// Tasks currently running
    pub fn in_flight(&self) -> usize {
        self.shared.in_flight.load(Ordering::Acquire)
    }
}

/// Runs submitted tasks with bounded concurrency until quiescence
pub struct Scheduler<T> {
    handle: SchedulerHandle<T>,
    receiver: mpsc::UnboundedReceiver<T>,
    max_concurrency: usize,
    progress_interval: u64,
}

impl<T: Send + 'static> Scheduler<T> {
    /// Creates a scheduler running at most `max_concurrency` tasks at once
    ///
    /// A cap of 0 selects `default_max_concurrency()`.
    pub fn new(max_concurrency: usize) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let max_concurrency = if max_concurrency == 0 {
            default_max_concurrency()
        } else {
            max_concurrency
        };

        Self {
            handle: SchedulerHandle {
                sender,
                shared: Arc::new(Shared::default()),
            },
            receiver,
            max_concurrency,
            progress_interval: 0,
        }
    }

    /// Logs progress every `interval` finished tasks (0 disables)
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn handle(&self) -> SchedulerHandle<T> {
        self.handle.clone()
    }

    pub fn submit(&self, task: T) {
        self.handle.submit(task);
    }

    /// Runs tasks until none is queued or running
    ///
    /// Every task is passed to `handler` along with a handle it can use to
    /// submit follow-up tasks. A panicking task is logged and counted as
    /// finished; it never stalls the run.
    ///
    /// # Returns
    ///
    /// The number of tasks that ran
    pub async fn run<F, Fut>(self, handler: F) -> u64
    where
        F: Fn(T, SchedulerHandle<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let Self {
            handle,
            mut receiver,
            max_concurrency,
            progress_interval,
        } = self;

        let shared = Arc::clone(&handle.shared);
        let handler = Arc::new(handler);
        let permits = Arc::new(Semaphore::new(max_concurrency));
        let mut workers = JoinSet::new();
        let mut joined: u64 = 0;

        tracing::debug!("Scheduler running with concurrency cap {}", max_concurrency);

        while shared.outstanding.load(Ordering::Acquire) > 0 {
            tokio::select! {
                Some(task) = receiver.recv() => {
                    let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
                        break;
                    };
                    shared.in_flight.fetch_add(1, Ordering::AcqRel);

                    let completion = Completion(Arc::clone(&shared));
                    let handler = Arc::clone(&handler);
                    let handle = handle.clone();

                    workers.spawn(async move {
                        let _completion = completion;
                        let _permit = permit;
                        handler(task, handle).await;
                    });
                }
                Some(result) = workers.join_next() => {
                    if let Err(e) = result {
                        tracing::warn!("Crawl task failed: {}", e);
                    }

                    joined += 1;
                    if progress_interval > 0 && joined % progress_interval == 0 {
                        tracing::info!(
                            "Progress: {} tasks finished, {} running, {} outstanding",
                            joined,
                            shared.in_flight.load(Ordering::Acquire),
                            shared.outstanding.load(Ordering::Acquire)
                        );
                    }
                }
                _ = shared.quiescent.notified() => {}
            }
        }

        while let Some(result) = workers.join_next().await {
            if let Err(e) = result {
                tracing::warn!("Crawl task failed: {}", e);
            }
        }

        shared.completed.load(Ordering::Relaxed)
    }
}
