//! Keyspace handlers.

use std::time::Duration;

use serde_json::Value;
use sieve_engine::Engine;

use crate::{Error, Output, Result};

/// Handle HSet
pub fn hset(engine: &Engine, key: &str, fields: Vec<(String, String)>) -> Result<Output> {
    if fields.is_empty() {
        return Err(Error::InvalidInput {
            reason: "wrong number of arguments for 'hset' command".to_string(),
        });
    }
    let added = engine.hset(key, fields)?;
    Ok(Output::Uint(added as u64))
}

/// Handle JsonSet
pub fn json_set(engine: &Engine, key: &str, path: &str, value: Value) -> Result<Output> {
    engine.json_set(key, path, value)?;
    Ok(Output::Unit)
}

/// Handle Del
pub fn del(engine: &Engine, key: &str) -> Result<Output> {
    Ok(Output::Bool(engine.del(key)))
}

/// Handle Expire
pub fn expire(engine: &Engine, key: &str, seconds: u64) -> Result<Output> {
    Ok(Output::Bool(engine.expire(key, Duration::from_secs(seconds))))
}

/// Handle Persist
pub fn persist(engine: &Engine, key: &str) -> Result<Output> {
    Ok(Output::Bool(engine.persist(key)))
}
