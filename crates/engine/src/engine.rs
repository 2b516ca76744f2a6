//! Engine facade
//!
//! [`Engine`] wires the keyspace, the index registry, and the background GC
//! machinery together and exposes one method per command. Every method
//! captures a single configuration snapshot at its start.
//!
//! # Example
//!
//! ```ignore
//! use sieve_engine::{Engine, SearchRequest};
//! use sieve_core::{FieldSpec, IndexDefinition, StorageModel};
//!
//! let engine = Engine::builder().open()?;
//! engine.create_index(
//!     IndexDefinition::new("idx", StorageModel::Hash)
//!         .prefix("doc:")
//!         .field(FieldSpec::text("title")),
//! )?;
//! engine.hset("doc:1", [("title", "hello world")])?;
//! let response = engine.search("idx", &SearchRequest::new("hello"))?;
//! ```

use crate::aggregate::{execute_aggregate, AggregateRequest, AggregateResponse};
use crate::error::Result;
use crate::index::{GcMode, GcStats, IndexInfo};
use crate::keyspace::Keyspace;
use crate::registry::IndexRegistry;
use crate::scheduler::GcScheduler;
use crate::search::{execute_search, SearchRequest, SearchResponse};
use crate::sweeper::{SweepReport, Sweeper, DEFAULT_TICK};
use parking_lot::Mutex;
use serde_json::Value;
use sieve_core::{ConfigRegistry, Document, IndexDefinition, SearchConfig};
use sieve_search::ScorerRegistry;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::info;

/// Queue depth of the GC scheduler
const GC_QUEUE_DEPTH: usize = 1024;

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`Engine`]
///
/// ```ignore
/// let engine = Engine::builder()
///     .config_file("/etc/sieve/sieve.toml")
///     .gc_threads(2)
///     .background(false)
///     .open()?;
/// ```
#[derive(Debug, Clone)]
pub struct EngineBuilder {
    config: SearchConfig,
    config_file: Option<PathBuf>,
    gc_threads: usize,
    sweep_tick: Duration,
    background: bool,
}

impl EngineBuilder {
    /// Defaults: built-in configuration, one GC worker, background sweeper on
    pub fn new() -> Self {
        EngineBuilder {
            config: SearchConfig::default(),
            config_file: None,
            gc_threads: 1,
            sweep_tick: DEFAULT_TICK,
            background: true,
        }
    }

    /// Start from an explicit configuration
    pub fn config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Load the initial configuration from a TOML file; overrides [`EngineBuilder::config`]
    pub fn config_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config_file = Some(path.into());
        self
    }

    /// Number of GC worker threads (at least one is started)
    pub fn gc_threads(mut self, threads: usize) -> Self {
        self.gc_threads = threads;
        self
    }

    /// Time between background sweeps
    pub fn sweep_tick(mut self, tick: Duration) -> Self {
        self.sweep_tick = tick;
        self
    }

    /// Run the sweeper thread; when off, call [`Engine::sweep`] explicitly
    pub fn background(mut self, enabled: bool) -> Self {
        self.background = enabled;
        self
    }

    /// Build the engine
    pub fn open(self) -> Result<Engine> {
        let config = match &self.config_file {
            Some(path) => SearchConfig::from_file(path)?,
            None => {
                self.config.validate()?;
                self.config
            }
        };

        let config = Arc::new(ConfigRegistry::new(config));
        let registry = Arc::new(IndexRegistry::new(Arc::clone(&config)));
        let keyspace = Arc::new(Keyspace::new());
        keyspace.subscribe(registry.clone());

        let scheduler = Arc::new(GcScheduler::new(self.gc_threads.max(1), GC_QUEUE_DEPTH)?);
        let sweeper = Arc::new(Sweeper::new(
            Arc::clone(&keyspace),
            Arc::clone(&registry),
            Arc::clone(&scheduler),
            self.sweep_tick,
        ));
        let handle = if self.background {
            Some(sweeper.start()?)
        } else {
            None
        };

        info!(
            target: "sieve::index",
            gc_threads = self.gc_threads.max(1),
            background = self.background,
            "Engine started"
        );
        Ok(Engine {
            config,
            registry,
            keyspace,
            scorers: ScorerRegistry::default(),
            scheduler,
            sweeper,
            sweeper_handle: Mutex::new(handle),
        })
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Engine
// ============================================================================

/// Search engine over an in-memory keyspace
pub struct Engine {
    config: Arc<ConfigRegistry>,
    registry: Arc<IndexRegistry>,
    keyspace: Arc<Keyspace>,
    scorers: ScorerRegistry,
    scheduler: Arc<GcScheduler>,
    sweeper: Arc<Sweeper>,
    sweeper_handle: Mutex<Option<JoinHandle<()>>>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("indexes", &self.registry.names())
            .field("keys", &self.keyspace.len())
            .field("scheduler", &self.scheduler)
            .finish()
    }
}

impl Engine {
    /// Start configuring an engine
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Engine with `config` and no sweeper thread
    pub fn new(config: SearchConfig) -> Result<Self> {
        EngineBuilder::new().config(config).background(false).open()
    }

    /// The document store
    pub fn keyspace(&self) -> &Arc<Keyspace> {
        &self.keyspace
    }

    /// Current configuration snapshot
    pub fn config(&self) -> Arc<SearchConfig> {
        self.config.snapshot()
    }

    // ------------------------------------------------------------------------
    // Index lifecycle
    // ------------------------------------------------------------------------

    /// FT.CREATE: register an index and index existing matching keys
    pub fn create_index(&self, definition: IndexDefinition) -> Result<()> {
        self.registry.create(definition, self.keyspace.as_ref())?;
        Ok(())
    }

    /// FT.DROPINDEX: documents stay in the keyspace
    pub fn drop_index(&self, name: &str) -> Result<()> {
        self.registry.drop_index(name)
    }

    /// Names of live indexes
    pub fn index_names(&self) -> Vec<String> {
        self.registry.names()
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// FT.SEARCH
    pub fn search(&self, index: &str, request: &SearchRequest) -> Result<SearchResponse> {
        let config = self.config.snapshot();
        let index = self.registry.get(index)?;
        index.touch();
        execute_search(&index, request, &config, &self.scorers, self.keyspace.as_ref())
    }

    /// FT.AGGREGATE
    pub fn aggregate(&self, index: &str, request: &AggregateRequest) -> Result<AggregateResponse> {
        let config = self.config.snapshot();
        let index = self.registry.get(index)?;
        index.touch();
        execute_aggregate(&index, request, &config, self.keyspace.as_ref())
    }

    // ------------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------------

    /// FT.INFO
    pub fn info(&self, index: &str) -> Result<IndexInfo> {
        Ok(self.registry.get(index)?.info())
    }

    /// FT.DEBUG TTL: whole seconds of idle time left, `-1` for permanent indexes
    pub fn debug_ttl(&self, index: &str) -> Result<i64> {
        self.debug_ttl_at(index, Instant::now())
    }

    /// FT.DEBUG TTL as of `now`
    pub fn debug_ttl_at(&self, index: &str, now: Instant) -> Result<i64> {
        let index = self.registry.get(index)?;
        Ok(index.remaining_ttl(now).map_or(-1, |left| left.as_secs() as i64))
    }

    /// FT.DEBUG GC_FORCEINVOKE: run one collection cycle now
    pub fn debug_gc_force_invoke(&self, index: &str) -> Result<GcStats> {
        let mode = GcMode::from(self.config.snapshot().gc_policy);
        let index = self.registry.get(index)?;
        let run = index.collect_garbage(mode);
        info!(
            target: "sieve::gc",
            index = %index.name(),
            docs = run.docs,
            entries = run.entries,
            settled = run.settled,
            "Forced GC cycle"
        );
        Ok(index.gc_stats())
    }

    /// Run one sweep as of `now` and wait for the GC jobs it queued
    pub fn sweep(&self, now: Instant) -> SweepReport {
        let report = self.sweeper.run_once(now);
        self.scheduler.drain();
        report
    }

    // ------------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------------

    /// FT.CONFIG GET: one option, or `*` for all
    pub fn config_get(&self, name: &str) -> Result<Vec<(String, String)>> {
        Ok(self.config.get(name)?)
    }

    /// FT.CONFIG SET: takes effect for operations that start afterwards
    pub fn config_set(&self, name: &str, value: &str) -> Result<()> {
        Ok(self.config.set(name, value)?)
    }

    // ------------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------------

    /// HSET
    pub fn hset<I, K, V>(&self, key: &str, pairs: I) -> Result<usize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.keyspace.hset(key, pairs)
    }

    /// JSON.SET at the root path
    pub fn json_set(&self, key: &str, path: &str, value: Value) -> Result<()> {
        self.keyspace.json_set(key, path, value)
    }

    /// DEL
    pub fn del(&self, key: &str) -> bool {
        self.keyspace.del(key)
    }

    /// EXPIRE
    pub fn expire(&self, key: &str, ttl: Duration) -> bool {
        self.keyspace.expire(key, ttl)
    }

    /// PERSIST
    pub fn persist(&self, key: &str) -> bool {
        self.keyspace.persist(key)
    }

    /// Read a document
    pub fn get(&self, key: &str) -> Option<Document> {
        self.keyspace.get(key)
    }

    // ------------------------------------------------------------------------
    // Shutdown
    // ------------------------------------------------------------------------

    /// Stop the sweeper thread and the GC workers; idempotent
    pub fn shutdown(&self) {
        self.sweeper.shutdown();
        if let Some(handle) = self.sweeper_handle.lock().take() {
            let _ = handle.join();
        }
        self.scheduler.shutdown();
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.shutdown();
    }
}
