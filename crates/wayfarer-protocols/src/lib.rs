//! # Wayfarer Protocols
//!
//! Core contract definitions for the Wayfarer agent loop.
//! Contains the closed action vocabulary, the journey report schema, the
//! run trace types, and the interface the loop decides through - no
//! implementations.
//!
//! ## Core pieces
//!
//! - [`Action`] - the closed set of browser operations a journey may contain
//! - [`JourneyReport`] - the validated terminal output of a run
//! - [`StepRecord`] / [`RetryEvent`] - the append-only run trace
//! - [`DecisionOracle`] - trait for the pluggable next-action chooser
//! - [`RunPolicy`] - instructions plus the numeric knobs bounding a run

pub mod action;
pub mod error;
pub mod oracle;
pub mod policy;
pub mod report;
pub mod run;
pub mod trace;

// Re-export core types
pub use action::Action;
pub use error::{OracleError, ValidationError};
pub use oracle::{
    DecisionContext, DecisionOracle, OracleDecision, OracleReply, ProposedCall, ToolSpec,
};
pub use policy::RunPolicy;
pub use report::JourneyReport;
pub use run::{AbortSignal, FinalResult, RunError, RunRequest, RunStatus};
pub use trace::{
    RetryEvent, StepRecord, ToolCallRecord, ToolErrorKind, ToolOutcome, ToolResultRecord, Usage,
};
