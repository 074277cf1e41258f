//! # Wayfarer Runtime
//!
//! The agentic browser-automation control loop: observe remote browser
//! state, ask the decision oracle for the next action, execute it
//! through the tool bridge, decide when to stop, and reduce the trace
//! into a final result.
//!
//! Entry point: [`run_agent`]. The loop itself is [`AgentLoop`]; the
//! rate-limit supervisor is [`RetryOracle`]; shipped instruction
//! presets live in [`policy`].

pub mod agent_loop;
pub mod diagnostics;
pub mod policy;
pub mod reporter;
pub mod retry;
pub mod runner;

pub use agent_loop::{AgentLoop, LoopOutcome};
pub use diagnostics::{write_artifact, RunArtifact};
pub use policy::{task_prompt, PolicyPreset};
pub use reporter::reduce;
pub use retry::{RetryConfig, RetryOracle};
pub use runner::{run_agent, run_agent_with_bridge, RunOptions};
