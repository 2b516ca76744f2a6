//! Per-query execution budget
//!
//! A query captures a [`QueryBudget`] at start from the configuration
//! snapshot. Long loops (term expansion, posting merges) call
//! [`QueryBudget::check_time`] so that an expired deadline stops work
//! promptly instead of completing and discarding.

use crate::config::{SearchConfig, TimeoutPolicy};
use std::time::{Duration, Instant};

/// How often (in loop iterations) callers should poll the clock
pub const CHECK_INTERVAL: usize = 256;

// ============================================================================
// QueryBudget
// ============================================================================

/// Time and expansion limits for one query
///
/// # Default Values
///
/// - timeout: 500ms
/// - max_expansions: 200
/// - on_timeout: return partial results
#[derive(Debug, Clone, Copy)]
pub struct QueryBudget {
    deadline: Option<Instant>,
    /// Maximum terms one pattern may expand to
    pub max_expansions: usize,
    /// Minimum literal length of expansion patterns
    pub min_prefix: usize,
    /// Behaviour when a limit is hit
    pub on_timeout: TimeoutPolicy,
}

impl Default for QueryBudget {
    fn default() -> Self {
        Self::from_config(&SearchConfig::default())
    }
}

impl QueryBudget {
    /// Budget starting now, limits taken from a config snapshot
    pub fn from_config(config: &SearchConfig) -> Self {
        QueryBudget {
            deadline: config.timeout().map(|t| Instant::now() + t),
            max_expansions: config.max_expansions,
            min_prefix: config.min_prefix,
            on_timeout: config.on_timeout,
        }
    }

    /// Budget without a deadline
    pub fn unlimited() -> Self {
        QueryBudget {
            deadline: None,
            max_expansions: usize::MAX,
            min_prefix: 1,
            on_timeout: TimeoutPolicy::Return,
        }
    }

    /// Builder: replace the deadline with `timeout` from now
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Builder: set max expansions
    pub fn with_max_expansions(mut self, max: usize) -> Self {
        self.max_expansions = max;
        self
    }

    /// Builder: set the minimum literal length
    pub fn with_min_prefix(mut self, min: usize) -> Self {
        self.min_prefix = min;
        self
    }

    /// Builder: set the timeout policy
    pub fn with_policy(mut self, policy: TimeoutPolicy) -> Self {
        self.on_timeout = policy;
        self
    }

    /// True once the deadline has passed
    pub fn is_expired(&self) -> bool {
        self.deadline.map_or(false, |d| Instant::now() >= d)
    }

    /// Poll the clock every [`CHECK_INTERVAL`] iterations
    pub fn check_time(&self, iteration: usize) -> bool {
        iteration % CHECK_INTERVAL == 0 && self.is_expired()
    }

    /// True when limits should fail the query instead of truncating
    pub fn fails_on_limit(&self) -> bool {
        self.on_timeout == TimeoutPolicy::Fail
    }
}
