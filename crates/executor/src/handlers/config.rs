//! Configuration handlers.

use sieve_engine::Engine;

use crate::{Output, Result};

/// Handle ConfigGet
pub fn get(engine: &Engine, option: &str) -> Result<Output> {
    Ok(Output::ConfigPairs(engine.config_get(option)?))
}

/// Handle ConfigSet
pub fn set(engine: &Engine, option: &str, value: &str) -> Result<Output> {
    engine.config_set(option, value)?;
    Ok(Output::Unit)
}
