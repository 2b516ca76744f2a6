//! Worker pool for background garbage collection
//!
//! The sweeper decides which indexes are due and queues one job per index;
//! workers run the cycles so a slow index does not delay key expiry. An
//! index already waiting in the queue is not queued twice.

use crate::error::{Error, Result};
use crate::index::{GcMode, Index};
use parking_lot::{Condvar, Mutex};
use rustc_hash::FxHashSet;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::error;

/// What happened to a submitted job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submitted {
    /// Added to the queue
    Queued,
    /// The index was already waiting
    AlreadyQueued,
}

/// The queue is full or the scheduler is shut down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackpressureError;

impl std::fmt::Display for BackpressureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gc scheduler queue is full")
    }
}

impl std::error::Error for BackpressureError {}

/// Scheduler metrics snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Jobs waiting
    pub queue_depth: usize,
    /// Jobs running
    pub active_jobs: usize,
    /// Jobs finished since creation
    pub jobs_completed: u64,
    /// Worker threads
    pub worker_count: usize,
}

struct GcJob {
    index: Arc<Index>,
    mode: GcMode,
}

#[derive(Default)]
struct Queue {
    jobs: VecDeque<GcJob>,
    waiting: FxHashSet<String>,
}

struct Shared {
    queue: Mutex<Queue>,
    work_ready: Condvar,
    drain_cond: Condvar,
    shutdown: AtomicBool,
    active_jobs: AtomicUsize,
    max_queue_depth: usize,
    jobs_completed: AtomicU64,
}

/// Fixed pool of GC workers fed by a FIFO queue
pub struct GcScheduler {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    num_threads: usize,
}

impl std::fmt::Debug for GcScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcScheduler").field("stats", &self.stats()).finish()
    }
}

impl GcScheduler {
    /// Start `num_threads` workers named `sieve-gc-N`
    pub fn new(num_threads: usize, max_queue_depth: usize) -> Result<Self> {
        let shared = Arc::new(Shared {
            queue: Mutex::new(Queue::default()),
            work_ready: Condvar::new(),
            drain_cond: Condvar::new(),
            shutdown: AtomicBool::new(false),
            active_jobs: AtomicUsize::new(0),
            max_queue_depth,
            jobs_completed: AtomicU64::new(0),
        });

        let scheduler = GcScheduler {
            shared: Arc::clone(&shared),
            workers: Mutex::new(Vec::with_capacity(num_threads)),
            num_threads,
        };
        for i in 0..num_threads {
            let shared = Arc::clone(&shared);
            let handle = std::thread::Builder::new()
                .name(format!("sieve-gc-{}", i))
                .spawn(move || worker_loop(&shared));
            match handle {
                Ok(handle) => scheduler.workers.lock().push(handle),
                Err(err) => {
                    scheduler.shutdown();
                    return Err(Error::Background(err.to_string()));
                }
            }
        }
        Ok(scheduler)
    }

    /// Queue a collection cycle for `index`
    pub fn submit(&self, index: Arc<Index>, mode: GcMode) -> std::result::Result<Submitted, BackpressureError> {
        if self.shared.shutdown.load(Ordering::Acquire) {
            return Err(BackpressureError);
        }
        {
            let mut queue = self.shared.queue.lock();
            if queue.waiting.contains(index.name()) {
                return Ok(Submitted::AlreadyQueued);
            }
            if queue.jobs.len() >= self.shared.max_queue_depth {
                return Err(BackpressureError);
            }
            queue.waiting.insert(index.name().to_string());
            queue.jobs.push_back(GcJob { index, mode });
        }
        self.shared.work_ready.notify_one();
        Ok(Submitted::Queued)
    }

    /// Block until every queued and running job has finished
    pub fn drain(&self) {
        let mut queue = self.shared.queue.lock();
        while !queue.jobs.is_empty() || self.shared.active_jobs.load(Ordering::Acquire) > 0 {
            self.shared.drain_cond.wait(&mut queue);
        }
    }

    /// Stop accepting jobs, finish the queue, and join the workers
    pub fn shutdown(&self) {
        self.shared.shutdown.store(true, Ordering::Release);
        {
            // Notify under the lock so a worker about to wait cannot miss it
            let _queue = self.shared.queue.lock();
            self.shared.work_ready.notify_all();
        }
        let mut workers = self.workers.lock();
        for handle in workers.drain(..) {
            let _ = handle.join();
        }
    }

    /// Current metrics
    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            queue_depth: self.shared.queue.lock().jobs.len(),
            active_jobs: self.shared.active_jobs.load(Ordering::Relaxed),
            jobs_completed: self.shared.jobs_completed.load(Ordering::Relaxed),
            worker_count: self.num_threads,
        }
    }
}

/// Decrements `active_jobs` and wakes drainers, also when a job panics
struct ActiveJobGuard<'a> {
    shared: &'a Shared,
}

impl Drop for ActiveJobGuard<'_> {
    fn drop(&mut self) {
        let previous = self.shared.active_jobs.fetch_sub(1, Ordering::Release);
        self.shared.jobs_completed.fetch_add(1, Ordering::Relaxed);
        let queue = self.shared.queue.lock();
        if previous == 1 && queue.jobs.is_empty() {
            self.shared.drain_cond.notify_all();
        }
    }
}

fn worker_loop(shared: &Shared) {
    loop {
        let job = {
            let mut queue = shared.queue.lock();
            loop {
                if let Some(job) = queue.jobs.pop_front() {
                    queue.waiting.remove(job.index.name());
                    shared.active_jobs.fetch_add(1, Ordering::Release);
                    break job;
                }
                if shared.shutdown.load(Ordering::Acquire) {
                    return;
                }
                shared.work_ready.wait(&mut queue);
            }
        };

        let _guard = ActiveJobGuard { shared };
        let GcJob { index, mode } = job;
        let run = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| index.collect_garbage(mode)));
        if let Err(panic) = run {
            error!(
                target: "sieve::gc",
                index = %index.name(),
                "gc cycle panicked: {}",
                panic.downcast_ref::<&str>().copied().unwrap_or("(non-string panic)")
            );
        }
    }
}

impl Drop for GcScheduler {
    fn drop(&mut self) {
        self.shutdown();
    }
}
