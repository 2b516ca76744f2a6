//! Background sweeper thread
//!
//! Every tick the sweeper:
//! - expires keyspace keys whose TTL elapsed (indexes hear the deletes)
//! - removes temporary indexes idle past their TTL
//! - queues a GC job for each index that is due
//!
//! Shutdown is an atomic flag checked between short sleeps, so the thread
//! exits promptly even with a long tick.

use crate::error::{Error, Result};
use crate::index::GcMode;
use crate::keyspace::Keyspace;
use crate::registry::IndexRegistry;
use crate::scheduler::{GcScheduler, Submitted};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Default time between sweeps
pub const DEFAULT_TICK: Duration = Duration::from_millis(100);

/// What one sweep did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Keys removed because their TTL elapsed
    pub expired_keys: usize,
    /// Temporary indexes removed
    pub expired_indexes: Vec<String>,
    /// Indexes queued for garbage collection
    pub gc_queued: usize,
}

/// Periodic expiry and GC driver
pub struct Sweeper {
    keyspace: Arc<Keyspace>,
    registry: Arc<IndexRegistry>,
    scheduler: Arc<GcScheduler>,
    tick: Duration,
    shutdown: Arc<AtomicBool>,
}

impl Sweeper {
    /// Create a sweeper; nothing runs until [`Sweeper::start`]
    pub fn new(
        keyspace: Arc<Keyspace>,
        registry: Arc<IndexRegistry>,
        scheduler: Arc<GcScheduler>,
        tick: Duration,
    ) -> Self {
        Sweeper {
            keyspace,
            registry,
            scheduler,
            tick,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run one sweep as of `now`
    pub fn run_once(&self, now: Instant) -> SweepReport {
        let expired_keys = self.keyspace.expire_due(now);
        let expired_indexes = self.registry.expire_idle(now);
        let mode = GcMode::from(self.registry.config().gc_policy);

        let mut gc_queued = 0;
        for index in self.registry.due_for_gc(now) {
            match self.scheduler.submit(Arc::clone(&index), mode) {
                Ok(Submitted::Queued) => gc_queued += 1,
                Ok(Submitted::AlreadyQueued) => {}
                Err(err) => {
                    warn!(target: "sieve::gc", index = %index.name(), error = %err, "GC job not queued");
                }
            }
        }

        if expired_keys > 0 || !expired_indexes.is_empty() || gc_queued > 0 {
            debug!(
                target: "sieve::gc",
                expired_keys,
                expired_indexes = expired_indexes.len(),
                gc_queued,
                "sweep"
            );
        }
        SweepReport {
            expired_keys,
            expired_indexes,
            gc_queued,
        }
    }

    /// Start the sweeper thread
    pub fn start(self: &Arc<Self>) -> Result<JoinHandle<()>> {
        let sweeper = Arc::clone(self);
        thread::Builder::new()
            .name("sieve-sweeper".to_string())
            .spawn(move || {
                let slice = Duration::from_millis(100).min(sweeper.tick);
                while !sweeper.is_shutdown() {
                    let mut elapsed = Duration::ZERO;
                    while elapsed < sweeper.tick {
                        if sweeper.is_shutdown() {
                            return;
                        }
                        thread::sleep(slice);
                        elapsed += slice;
                    }
                    sweeper.run_once(Instant::now());
                }
            })
            .map_err(|err| Error::Background(err.to_string()))
    }

    /// Signal the thread to exit
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// True once shutdown was signaled
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}
