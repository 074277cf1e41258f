//! The `run_agent` entry point: wire the supervisor, loop, reducer and
//! diagnostics together for one run.
//!
//! The signature is infallible; every failure mode folds into
//! `FinalResult.error` so callers get exactly one structured outcome
//! per run.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use wayfarer_bridge::bridge::{BridgeConfig, ToolBridge};
use wayfarer_protocols::oracle::DecisionOracle;
use wayfarer_protocols::policy::RunPolicy;
use wayfarer_protocols::run::{AbortSignal, FinalResult, RunError, RunRequest, RunStatus};
use wayfarer_protocols::trace::Usage;

use crate::agent_loop::AgentLoop;
use crate::diagnostics::{write_artifact, RunArtifact};
use crate::policy::task_prompt;
use crate::reporter::reduce;
use crate::retry::{RetryConfig, RetryOracle};

/// Per-run wiring options beyond the policy itself.
pub struct RunOptions {
    /// Retry supervision for oracle calls.
    pub retry: RetryConfig,

    /// Where to write the per-run diagnostic artifact; `None` disables
    /// it.
    pub artifact_dir: Option<PathBuf>,

    /// Caller-owned cancellation, if any.
    pub abort: Option<Arc<AbortSignal>>,

    /// Override for the tool-server command; defaults to the
    /// Playwright tool server attached via the run's CDP endpoint.
    pub bridge: Option<BridgeConfig>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            artifact_dir: None,
            abort: None,
            bridge: None,
        }
    }
}

/// Run one journey end to end: open the bridge, drive the loop, reduce
/// the trace, write diagnostics.
pub async fn run_agent(
    request: &RunRequest,
    oracle: Arc<dyn DecisionOracle>,
    policy: RunPolicy,
    options: RunOptions,
) -> FinalResult {
    let started_at = Utc::now();
    let config = options
        .bridge
        .clone()
        .unwrap_or_else(|| BridgeConfig::for_endpoint(&request.cdp_endpoint));

    info!("Starting run {} against {}", request.id, request.url);

    let bridge = match ToolBridge::open(&config).await {
        Ok(bridge) => bridge,
        Err(e) => {
            let result = FinalResult {
                status: RunStatus::Error,
                final_url: None,
                site_description: None,
                steps_summary: None,
                journey: None,
                error: Some(RunError {
                    kind: "connection".to_string(),
                    message: e.to_string(),
                    retry_count: Some(0),
                }),
                usage: Usage::default(),
            };
            if let Some(dir) = &options.artifact_dir {
                let artifact = RunArtifact::assemble(
                    &request.id,
                    &request.url,
                    started_at,
                    &policy.instructions,
                    &task_prompt(&request.url),
                    &result,
                    Vec::new(),
                    Vec::new(),
                    None,
                );
                write_artifact(dir, &artifact);
            }
            return result;
        }
    };

    run_agent_with_bridge(request, oracle, policy, options, bridge).await
}

/// As [`run_agent`], but over an already-open bridge. The bridge is
/// consumed and closed whatever the outcome.
pub async fn run_agent_with_bridge(
    request: &RunRequest,
    oracle: Arc<dyn DecisionOracle>,
    policy: RunPolicy,
    options: RunOptions,
    mut bridge: ToolBridge,
) -> FinalResult {
    let started_at = Utc::now();
    let task = task_prompt(&request.url);

    let supervisor = Arc::new(RetryOracle::new(oracle, options.retry));

    let mut agent = AgentLoop::new(supervisor.clone(), policy.clone());
    if let Some(abort) = options.abort {
        agent = agent.with_abort_signal(abort);
    }

    let outcome = agent.run(&mut bridge, &task).await;
    let result = reduce(&outcome, supervisor.retry_count());

    if let Some(dir) = &options.artifact_dir {
        let artifact = RunArtifact::assemble(
            &request.id,
            &request.url,
            started_at,
            &policy.instructions,
            &task,
            &result,
            outcome.trace,
            supervisor.events(),
            outcome.raw_report,
        );
        write_artifact(dir, &artifact);
    }

    result
}
