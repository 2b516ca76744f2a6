//! The Executor - single entry point to the Sieve engine.
//!
//! The Executor is a stateless dispatcher that routes commands to the
//! handlers and converts results to outputs.

use std::sync::Arc;

use sieve_engine::Engine;
use tracing::debug;

use crate::handlers;
use crate::{Command, Output, Result};

/// The command executor.
///
/// The Executor holds a reference to the engine but no state of its own.
/// It is `Send + Sync` and can be shared across threads.
///
/// # Example
///
/// ```ignore
/// use sieve_executor::{Command, Executor};
/// use sieve_engine::Engine;
///
/// let executor = Executor::new(Arc::new(Engine::builder().open()?));
/// executor.execute(Command::HSet {
///     key: "doc:1".into(),
///     fields: vec![("title".into(), "hello".into())],
/// })?;
/// ```
pub struct Executor {
    engine: Arc<Engine>,
}

impl Executor {
    /// Create a new executor wrapping an engine.
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }

    /// Execute a single command.
    pub fn execute(&self, cmd: Command) -> Result<Output> {
        debug!(target: "sieve::executor", command = cmd.name(), "execute");
        let engine = self.engine.as_ref();
        match cmd {
            Command::Ping => Ok(Output::Pong {
                version: env!("CARGO_PKG_VERSION").to_string(),
            }),

            // Index commands
            Command::CreateIndex { definition } => handlers::index::create(engine, definition),
            Command::DropIndex { index } => handlers::index::drop(engine, &index),
            Command::Info { index } => handlers::index::info(engine, &index),
            Command::DebugTtl { index } => handlers::index::debug_ttl(engine, &index),
            Command::DebugGcForceInvoke { index } => handlers::index::debug_gc_force_invoke(engine, &index),

            // Query commands
            Command::Search { index, request } => handlers::query::search(engine, &index, &request),
            Command::Aggregate { index, request } => handlers::query::aggregate(engine, &index, &request),

            // Config commands
            Command::ConfigGet { option } => handlers::config::get(engine, &option),
            Command::ConfigSet { option, value } => handlers::config::set(engine, &option, &value),

            // Document commands
            Command::HSet { key, fields } => handlers::document::hset(engine, &key, fields),
            Command::JsonSet { key, path, value } => handlers::document::json_set(engine, &key, &path, value),
            Command::Del { key } => handlers::document::del(engine, &key),
            Command::Expire { key, seconds } => handlers::document::expire(engine, &key, seconds),
            Command::Persist { key } => handlers::document::persist(engine, &key),
        }
    }

    /// Execute commands in order; results[i] corresponds to cmds[i].
    pub fn execute_many(&self, cmds: Vec<Command>) -> Vec<Result<Output>> {
        cmds.into_iter().map(|cmd| self.execute(cmd)).collect()
    }

    /// The underlying engine.
    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }
}
