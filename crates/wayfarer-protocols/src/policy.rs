//! Run policy: instructions plus the numeric knobs bounding a run.

use serde::{Deserialize, Serialize};

/// Configuration surface for one run.
///
/// Collapses the instruction text and the loop bounds into a single
/// value threaded through the runtime; no other knobs exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunPolicy {
    /// System instructions fixing the oracle's behavioral policy.
    pub instructions: String,

    /// Step budget: maximum loop iterations before terminating with an
    /// error.
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,

    /// Wall-clock budget for the whole run, in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Delay after a mutating action before the follow-up snapshot, in
    /// milliseconds.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

fn default_max_steps() -> u32 {
    35
}

fn default_timeout_seconds() -> u64 {
    300
}

fn default_settle_delay_ms() -> u64 {
    1000
}

impl RunPolicy {
    /// A policy with default bounds and the given instructions.
    pub fn new(instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
            max_steps: default_max_steps(),
            timeout_seconds: default_timeout_seconds(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    pub fn with_settle_delay_ms(mut self, settle_delay_ms: u64) -> Self {
        self.settle_delay_ms = settle_delay_ms;
        self
    }
}
