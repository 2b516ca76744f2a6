//! Runtime configuration for indexing and query execution
//!
//! Configuration is process-wide and mutable at runtime, but every operation
//! works against the immutable [`SearchConfig`] snapshot it captured when it
//! started. [`ConfigRegistry::set`] publishes a new snapshot; operations that
//! already hold the previous `Arc` are unaffected.
//!
//! A config file (`sieve.toml`) may seed the initial snapshot:
//!
//! ```toml
//! multi_text_offset_delta = 100
//! min_prefix = 2
//! max_expansions = 200
//! timeout_ms = 500
//! on_timeout = "return"
//! default_dialect = 1
//! gc_policy = "fork"
//! fork_gc_run_interval_secs = 30
//! fork_gc_clean_threshold = 100
//! default_scorer = "TFIDF"
//! ```

use crate::error::{ConfigError, ConfigResult};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Config file name used by [`SearchConfig::from_file`] callers.
pub const CONFIG_FILE_NAME: &str = "sieve.toml";

/// Scorer names accepted by `DEFAULT_SCORER`.
pub const BUILTIN_SCORERS: &[&str] = &["TFIDF", "TFIDF.DOCNORM", "BM25", "DOCSCORE"];

/// Highest query dialect understood by the parser.
pub const MAX_DIALECT: u32 = 4;

/// Option names in the order `CONFIG GET *` reports them.
pub const OPTION_NAMES: &[&str] = &[
    "MULTI_TEXT_OFFSET_DELTA",
    "MINPREFIX",
    "MAXEXPANSIONS",
    "TIMEOUT",
    "ON_TIMEOUT",
    "DEFAULT_DIALECT",
    "GC_POLICY",
    "FORK_GC_RUN_INTERVAL",
    "FORK_GC_CLEAN_THRESHOLD",
    "DEFAULT_SCORER",
];

/// How deleted documents are reclaimed from the index structures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GcPolicy {
    /// Postings are purged inline with the delete
    Sync,
    /// A background sweeper collects garbage in batches
    #[default]
    Fork,
}

/// What a query does when it hits TIMEOUT or MAXEXPANSIONS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeoutPolicy {
    /// Truncate and return what is available
    #[default]
    Return,
    /// Fail the query
    Fail,
}

/// One immutable configuration snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Position gap inserted between consecutive values of a multi-value field
    pub multi_text_offset_delta: u32,
    /// Minimum literal length of prefix/suffix/contains patterns
    pub min_prefix: usize,
    /// Maximum number of terms one pattern may expand to
    pub max_expansions: usize,
    /// Query wall-clock budget in milliseconds (0 disables)
    pub timeout_ms: u64,
    /// Behaviour on TIMEOUT / MAXEXPANSIONS
    pub on_timeout: TimeoutPolicy,
    /// Query dialect used when a search does not name one
    pub default_dialect: u32,
    /// Garbage collection policy
    pub gc_policy: GcPolicy,
    /// Seconds between background sweeps
    pub fork_gc_run_interval_secs: u64,
    /// Pending deleted documents required before a sweep runs
    pub fork_gc_clean_threshold: usize,
    /// Scorer used when a search does not name one
    pub default_scorer: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            multi_text_offset_delta: 100,
            min_prefix: 2,
            max_expansions: 200,
            timeout_ms: 500,
            on_timeout: TimeoutPolicy::Return,
            default_dialect: 1,
            gc_policy: GcPolicy::Fork,
            fork_gc_run_interval_secs: 30,
            fork_gc_clean_threshold: 100,
            default_scorer: "TFIDF".to_string(),
        }
    }
}

fn parse_int<T: std::str::FromStr>(option: &str, value: &str) -> ConfigResult<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::invalid(option, format!("'{}' is not a valid integer", value)))
}

fn parse_non_negative(option: &str, value: &str) -> ConfigResult<u64> {
    let v: i64 = parse_int(option, value)?;
    if v < 0 {
        return Err(ConfigError::invalid(option, "must be >= 0"));
    }
    Ok(v as u64)
}

fn parse_positive(option: &str, value: &str) -> ConfigResult<u64> {
    let v = parse_non_negative(option, value)?;
    if v == 0 {
        return Err(ConfigError::invalid(option, "must be >= 1"));
    }
    Ok(v)
}

impl SearchConfig {
    /// Query timeout as a `Duration`, `None` when disabled.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    /// Background sweep interval.
    pub fn gc_interval(&self) -> Duration {
        Duration::from_secs(self.fork_gc_run_interval_secs)
    }

    /// Read one option by its (case-insensitive) name.
    pub fn get(&self, name: &str) -> ConfigResult<String> {
        let value = match name.to_ascii_uppercase().as_str() {
            "MULTI_TEXT_OFFSET_DELTA" => self.multi_text_offset_delta.to_string(),
            "MINPREFIX" => self.min_prefix.to_string(),
            "MAXEXPANSIONS" => self.max_expansions.to_string(),
            "TIMEOUT" => self.timeout_ms.to_string(),
            "ON_TIMEOUT" => match self.on_timeout {
                TimeoutPolicy::Return => "return".to_string(),
                TimeoutPolicy::Fail => "fail".to_string(),
            },
            "DEFAULT_DIALECT" => self.default_dialect.to_string(),
            "GC_POLICY" => match self.gc_policy {
                GcPolicy::Sync => "sync".to_string(),
                GcPolicy::Fork => "fork".to_string(),
            },
            "FORK_GC_RUN_INTERVAL" => self.fork_gc_run_interval_secs.to_string(),
            "FORK_GC_CLEAN_THRESHOLD" => self.fork_gc_clean_threshold.to_string(),
            "DEFAULT_SCORER" => self.default_scorer.clone(),
            _ => return Err(ConfigError::UnknownOption(name.to_string())),
        };
        Ok(value)
    }

    /// Validate and apply one option. On error `self` is left untouched.
    pub fn set(&mut self, name: &str, value: &str) -> ConfigResult<()> {
        let option = name.to_ascii_uppercase();
        match option.as_str() {
            "MULTI_TEXT_OFFSET_DELTA" => {
                let v = parse_non_negative(&option, value)?;
                self.multi_text_offset_delta = u32::try_from(v)
                    .map_err(|_| ConfigError::invalid(&option, "value too large"))?;
            }
            "MINPREFIX" => self.min_prefix = parse_positive(&option, value)? as usize,
            "MAXEXPANSIONS" => self.max_expansions = parse_positive(&option, value)? as usize,
            "TIMEOUT" => self.timeout_ms = parse_non_negative(&option, value)?,
            "ON_TIMEOUT" => {
                self.on_timeout = match value.to_ascii_lowercase().as_str() {
                    "return" => TimeoutPolicy::Return,
                    "fail" => TimeoutPolicy::Fail,
                    _ => return Err(ConfigError::invalid(&option, "expected RETURN or FAIL")),
                }
            }
            "DEFAULT_DIALECT" => {
                let v = parse_positive(&option, value)?;
                if v > MAX_DIALECT as u64 {
                    return Err(ConfigError::invalid(
                        &option,
                        format!("dialect must be between 1 and {}", MAX_DIALECT),
                    ));
                }
                self.default_dialect = v as u32;
            }
            "GC_POLICY" => {
                self.gc_policy = match value.to_ascii_lowercase().as_str() {
                    "sync" => GcPolicy::Sync,
                    "fork" => GcPolicy::Fork,
                    _ => return Err(ConfigError::invalid(&option, "expected SYNC or FORK")),
                }
            }
            "FORK_GC_RUN_INTERVAL" => {
                self.fork_gc_run_interval_secs = parse_positive(&option, value)?
            }
            "FORK_GC_CLEAN_THRESHOLD" => {
                self.fork_gc_clean_threshold = parse_non_negative(&option, value)? as usize
            }
            "DEFAULT_SCORER" => {
                let upper = value.to_ascii_uppercase();
                if !BUILTIN_SCORERS.contains(&upper.as_str()) {
                    return Err(ConfigError::invalid(&option, format!("unknown scorer '{}'", value)));
                }
                self.default_scorer = upper;
            }
            _ => return Err(ConfigError::UnknownOption(name.to_string())),
        }
        Ok(())
    }

    /// Check every field against the same rules `set` enforces.
    pub fn validate(&self) -> ConfigResult<()> {
        let mut probe = SearchConfig::default();
        for name in OPTION_NAMES {
            probe.set(name, &self.get(name)?)?;
        }
        Ok(())
    }

    /// Read and parse config from a TOML file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::Load(format!("failed to read '{}': {}", path.display(), e))
        })?;
        let config: SearchConfig = toml::from_str(&content).map_err(|e| {
            ConfigError::Load(format!("failed to parse '{}': {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Load(format!("failed to serialize config: {}", e)))?;
        std::fs::write(path, content)
            .map_err(|e| ConfigError::Load(format!("failed to write '{}': {}", path.display(), e)))
    }
}

/// Versioned holder of the current configuration snapshot.
#[derive(Debug)]
pub struct ConfigRegistry {
    current: RwLock<Arc<SearchConfig>>,
    version: AtomicU64,
}

impl Default for ConfigRegistry {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl ConfigRegistry {
    /// Create a registry publishing `config` as version 0.
    pub fn new(config: SearchConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(config)),
            version: AtomicU64::new(0),
        }
    }

    /// The snapshot operations should capture at their start.
    pub fn snapshot(&self) -> Arc<SearchConfig> {
        Arc::clone(&self.current.read())
    }

    /// Number of snapshots published after the initial one.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Read one option, or every option for `*`.
    pub fn get(&self, name: &str) -> ConfigResult<Vec<(String, String)>> {
        let snapshot = self.snapshot();
        if name == "*" {
            return OPTION_NAMES
                .iter()
                .map(|n| Ok((n.to_string(), snapshot.get(n)?)))
                .collect();
        }
        Ok(vec![(name.to_ascii_uppercase(), snapshot.get(name)?)])
    }

    /// Validate `value` and publish a new snapshot.
    pub fn set(&self, name: &str, value: &str) -> ConfigResult<()> {
        let mut guard = self.current.write();
        let mut next = SearchConfig::clone(&guard);
        next.set(name, value)?;
        *guard = Arc::new(next);
        let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
        info!(target: "sieve::config", option = %name, value = %value, version, "Configuration updated");
        Ok(())
    }
}
