//! Index lifecycle and debug handlers.

use sieve_core::IndexDefinition;
use sieve_engine::Engine;

use crate::{Output, Result};

/// Handle CreateIndex
pub fn create(engine: &Engine, definition: IndexDefinition) -> Result<Output> {
    engine.create_index(definition)?;
    Ok(Output::Unit)
}

/// Handle DropIndex
pub fn drop(engine: &Engine, index: &str) -> Result<Output> {
    engine.drop_index(index)?;
    Ok(Output::Unit)
}

/// Handle Info
pub fn info(engine: &Engine, index: &str) -> Result<Output> {
    Ok(Output::IndexInfo(engine.info(index)?))
}

/// Handle DebugTtl
pub fn debug_ttl(engine: &Engine, index: &str) -> Result<Output> {
    Ok(Output::Int(engine.debug_ttl(index)?))
}

/// Handle DebugGcForceInvoke
pub fn debug_gc_force_invoke(engine: &Engine, index: &str) -> Result<Output> {
    Ok(Output::GcStats(engine.debug_gc_force_invoke(index)?))
}
