//! Run request and final result shapes, plus the cooperative abort
//! signal.

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::trace::Usage;

/// What the caller hands the runtime for one run.
///
/// Persistence of the surrounding run record (and its
/// pending/running/complete/error status) belongs to the caller; the
/// core only consumes this subset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    /// Run record identity, used to key the diagnostic artifact.
    pub id: String,

    /// Target URL for the journey.
    pub url: String,

    /// Opaque handle to the live remote browser control channel.
    pub cdp_endpoint: String,
}

/// How a run terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    Error,
    Timeout,
}

/// Structured error descriptor carried by a failed [`FinalResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunError {
    /// Stable error category ("connection", "step_budget_exhausted",
    /// "oracle", "timeout", ...).
    pub kind: String,

    pub message: String,

    /// How many times the retry supervisor re-asked the oracle, when
    /// known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<u32>,
}

/// The structured outcome of a run.
///
/// On success the output fields are copied from the validated journey
/// report; on error or timeout they are all `None` and `error` is
/// populated. Exactly one of the two shapes is produced per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalResult {
    pub status: RunStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps_summary: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub journey: Option<Vec<Action>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RunError>,

    /// Aggregate oracle token usage for the run.
    #[serde(default)]
    pub usage: Usage,
}

impl FinalResult {
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Success
    }
}

/// Cooperative cancellation flag shared between a host and a running
/// loop. Checked at each iteration top.
pub struct AbortSignal {
    aborted: std::sync::atomic::AtomicBool,
}

impl AbortSignal {
    pub fn new() -> Self {
        Self {
            aborted: std::sync::atomic::AtomicBool::new(false),
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(std::sync::atomic::Ordering::Relaxed)
    }

    pub fn abort(&self) {
        self.aborted
            .store(true, std::sync::atomic::Ordering::Relaxed);
    }
}

impl Default for AbortSignal {
    fn default() -> Self {
        Self::new()
    }
}
