//! The append-only run trace.
//!
//! One [`StepRecord`] per agent loop iteration, never mutated after
//! append, consumed by the trace reducer and the diagnostics writer at
//! loop termination.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One tool invocation as recorded in the trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Pairing id. Oracle-proposed calls keep the provider's call id;
    /// loop-initiated calls (forced snapshots, settle waits) carry a
    /// synthesized UUID.
    pub call_id: String,

    /// Remote tool name as invoked.
    pub tool_name: String,

    /// Arguments passed to the tool.
    pub args: serde_json::Value,
}

/// The result of one recorded tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResultRecord {
    /// Pairing id matching the originating [`ToolCallRecord`].
    pub call_id: String,

    pub outcome: ToolOutcome,
}

/// Outcome of a tool invocation against the remote browser.
///
/// Expected remote-side failures surface here as `Error`, never as a
/// transport error, so the loop can react without exception-driven
/// control flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    Ok { payload: String },
    Error { kind: ToolErrorKind, message: String },
}

impl ToolOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, ToolOutcome::Error { .. })
    }
}

/// Classification of an expected remote-side tool failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    /// The element reference belongs to a superseded snapshot
    /// generation.
    StaleReference,

    /// No element matched the reference or selector.
    ElementNotFound,

    /// The element exists but does not support the requested
    /// interaction.
    WrongElementType,

    /// The proposed tool name is outside the whitelist; the call was
    /// dropped.
    UnknownTool,

    /// Anything else the remote side reported.
    Other,
}

impl ToolErrorKind {
    /// Whether the agent loop should re-observe and continue rather
    /// than terminate.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ToolErrorKind::UnknownTool)
    }
}

/// One loop iteration in the trace. Step numbers are 1-based and
/// monotonic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub step_number: u32,

    /// Ordered tool invocations made during this iteration, including
    /// the settle wait and snapshot that follow a mutating action.
    pub tool_calls: Vec<ToolCallRecord>,

    /// Ordered results, paired to calls by `call_id`.
    pub tool_results: Vec<ToolResultRecord>,

    /// Why this iteration ended ("tool_calls", "observe",
    /// "malformed_response", ...).
    pub finish_reason: Option<String>,
}

impl StepRecord {
    pub fn new(step_number: u32) -> Self {
        Self {
            step_number,
            tool_calls: Vec::new(),
            tool_results: Vec::new(),
            finish_reason: None,
        }
    }
}

/// One retry attempt recorded by the backoff supervisor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryEvent {
    pub timestamp: DateTime<Utc>,

    /// 1-based attempt counter.
    pub attempt: u32,

    /// Delay slept before re-asking.
    pub delay_ms: u64,

    /// Human-readable reason, from the error that triggered the retry.
    pub reason: String,
}

/// Aggregate token usage across oracle calls.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    /// Fold another usage sample into this aggregate.
    pub fn add(&mut self, other: &Usage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}
