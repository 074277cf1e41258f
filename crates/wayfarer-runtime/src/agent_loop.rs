//! The agent control loop.
//!
//! One iteration: check termination conditions, re-observe if the page
//! state is unknown, ask the oracle, then either execute its proposed
//! tool calls or validate its terminal report. The trace is append-only
//! and every iteration leaves exactly one [`StepRecord`] behind, except
//! the terminal report which ends the run instead.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

use wayfarer_bridge::bridge::{BridgeError, BridgeOp, ToolBridge};
use wayfarer_bridge::snapshot::SnapshotTracker;
use wayfarer_protocols::error::OracleError;
use wayfarer_protocols::oracle::{DecisionContext, DecisionOracle, OracleDecision};
use wayfarer_protocols::policy::RunPolicy;
use wayfarer_protocols::report::JourneyReport;
use wayfarer_protocols::run::{AbortSignal, RunError, RunStatus};
use wayfarer_protocols::trace::{
    StepRecord, ToolCallRecord, ToolErrorKind, ToolOutcome, ToolResultRecord, Usage,
};

/// Consecutive unavailable oracle replies tolerated before the run is
/// declared dead. Each re-ask still consumes a step.
const MAX_UNAVAILABLE_REASKS: u32 = 5;

/// What a finished loop hands back to its caller.
#[derive(Debug)]
pub struct LoopOutcome {
    pub status: RunStatus,

    /// The validated report, present iff `status` is success.
    pub report: Option<JourneyReport>,

    /// The raw report value as the oracle produced it.
    pub raw_report: Option<serde_json::Value>,

    /// Populated iff `status` is not success.
    pub error: Option<RunError>,

    /// The full append-only trace.
    pub trace: Vec<StepRecord>,

    /// Aggregate oracle token usage.
    pub usage: Usage,

    /// Loop iterations consumed, equal to the trace length.
    pub steps_taken: u32,
}

/// The control loop for one run.
///
/// Owns the policy and the oracle handle; borrows the bridge for the
/// duration of [`run`](AgentLoop::run) and closes it on every exit
/// path, including errors and timeout.
pub struct AgentLoop {
    oracle: Arc<dyn DecisionOracle>,
    policy: RunPolicy,
    abort: Arc<AbortSignal>,
}

impl AgentLoop {
    pub fn new(oracle: Arc<dyn DecisionOracle>, policy: RunPolicy) -> Self {
        Self {
            oracle,
            policy,
            abort: Arc::new(AbortSignal::new()),
        }
    }

    /// Use a caller-owned abort signal instead of a private one.
    pub fn with_abort_signal(mut self, abort: Arc<AbortSignal>) -> Self {
        self.abort = abort;
        self
    }

    /// Drive the loop to completion against an open bridge.
    ///
    /// The bridge is closed before this returns, whatever the outcome.
    pub async fn run(&self, bridge: &mut ToolBridge, task: &str) -> LoopOutcome {
        let outcome = self.drive(bridge, task).await;
        bridge.close().await;
        info!(
            "Run finished: {:?} after {} steps ({} tokens)",
            outcome.status, outcome.steps_taken, outcome.usage.total_tokens
        );
        outcome
    }

    async fn drive(&self, bridge: &mut ToolBridge, task: &str) -> LoopOutcome {
        let deadline = Instant::now() + Duration::from_secs(self.policy.timeout_seconds);
        let mut tracker = SnapshotTracker::new();
        let mut trace: Vec<StepRecord> = Vec::new();
        let mut usage = Usage::default();

        // The oracle must never plan against unknown page state, so
        // the first iteration (and the one after any failed action) is
        // a forced observation.
        let mut needs_observation = true;

        let mut unavailable_streak = 0u32;

        loop {
            if self.abort.is_aborted() {
                return error_outcome("aborted", "Run aborted by caller", trace, usage);
            }
            if Instant::now() >= deadline {
                return timeout_outcome(trace, usage);
            }
            if trace.len() as u32 >= self.policy.max_steps {
                return error_outcome(
                    "step_budget_exhausted",
                    "step budget exhausted",
                    trace,
                    usage,
                );
            }

            let step_number = trace.len() as u32 + 1;

            if needs_observation {
                let mut record = StepRecord::new(step_number);
                record.finish_reason = Some("observe".to_string());
                if let Err(e) = self.observe(bridge, &mut tracker, &mut record).await {
                    trace.push(record);
                    return error_outcome("bridge", &e.to_string(), trace, usage);
                }
                trace.push(record);
                needs_observation = false;
                continue;
            }

            let ctx = DecisionContext {
                instructions: self.policy.instructions.clone(),
                task: task.to_string(),
                tools: bridge.catalog().to_vec(),
                trace: trace.clone(),
            };

            let reply = match timeout_at(deadline, self.oracle.decide(&ctx)).await {
                Err(_) => return timeout_outcome(trace, usage),
                Ok(Err(OracleError::MalformedResponse(message))) => {
                    warn!("Oracle reply was malformed: {}", message);
                    let mut record = StepRecord::new(step_number);
                    record.finish_reason = Some("malformed_response".to_string());
                    trace.push(record);
                    continue;
                }
                Ok(Err(OracleError::Unavailable(message))) => {
                    // Transient provider outages are re-asked, each one
                    // costing a step; a sustained outage is terminal.
                    unavailable_streak += 1;
                    if unavailable_streak > MAX_UNAVAILABLE_REASKS {
                        return error_outcome("oracle", &message, trace, usage);
                    }
                    warn!(
                        "Oracle unavailable ({}/{}): {}",
                        unavailable_streak, MAX_UNAVAILABLE_REASKS, message
                    );
                    let mut record = StepRecord::new(step_number);
                    record.finish_reason = Some("oracle_unavailable".to_string());
                    trace.push(record);
                    continue;
                }
                Ok(Err(e)) => return error_outcome("oracle", &e.to_string(), trace, usage),
                Ok(Ok(reply)) => {
                    unavailable_streak = 0;
                    reply
                }
            };

            if let Some(sample) = &reply.usage {
                usage.add(sample);
            }

            match reply.decision {
                OracleDecision::FinalReport(raw) => match JourneyReport::validate(&raw) {
                    Ok(report) => {
                        debug!("Terminal report accepted at step {}", step_number);
                        return LoopOutcome {
                            status: RunStatus::Success,
                            report: Some(report),
                            raw_report: Some(raw),
                            error: None,
                            steps_taken: trace.len() as u32,
                            trace,
                            usage,
                        };
                    }
                    Err(e) => {
                        // An invalid report is a recoverable oracle
                        // mistake; the rejection lands in the trace so
                        // the next decision can correct it.
                        warn!("Terminal report rejected: {}", e);
                        let mut record = StepRecord::new(step_number);
                        record.finish_reason = Some("invalid_report".to_string());
                        trace.push(record);
                        continue;
                    }
                },
                OracleDecision::ToolCalls(calls) => {
                    let mut record = StepRecord::new(step_number);
                    record.finish_reason = Some(
                        reply
                            .finish_reason
                            .unwrap_or_else(|| "tool_calls".to_string()),
                    );

                    let mut mutated = false;
                    for call in calls {
                        if Instant::now() >= deadline {
                            trace.push(record);
                            return timeout_outcome(trace, usage);
                        }

                        record.tool_calls.push(ToolCallRecord {
                            call_id: call.call_id.clone(),
                            tool_name: call.name.clone(),
                            args: call.args.clone(),
                        });

                        let Some(op) = BridgeOp::from_remote_name(&call.name) else {
                            warn!("Oracle proposed non-whitelisted tool: {}", call.name);
                            record.tool_results.push(ToolResultRecord {
                                call_id: call.call_id,
                                outcome: ToolOutcome::Error {
                                    kind: ToolErrorKind::UnknownTool,
                                    message: format!("Tool is not permitted: {}", call.name),
                                },
                            });
                            continue;
                        };

                        // Reject references from superseded snapshots
                        // before they ever reach the remote side.
                        if let Some(element_ref) =
                            call.args.get("ref").and_then(|v| v.as_str())
                        {
                            if tracker.is_stale(element_ref) {
                                debug!("Rejecting stale reference {}", element_ref);
                                record.tool_results.push(ToolResultRecord {
                                    call_id: call.call_id,
                                    outcome: ToolOutcome::Error {
                                        kind: ToolErrorKind::StaleReference,
                                        message: format!(
                                            "Reference {} is from a superseded snapshot; take a new snapshot first",
                                            element_ref
                                        ),
                                    },
                                });
                                needs_observation = true;
                                break;
                            }
                        }

                        match bridge.invoke(op, call.args.clone()).await {
                            Err(e) => {
                                trace.push(record);
                                return error_outcome("bridge", &e.to_string(), trace, usage);
                            }
                            Ok(outcome) => {
                                if let ToolOutcome::Ok { payload } = &outcome {
                                    if op == BridgeOp::Snapshot {
                                        tracker.record(payload);
                                    }
                                    if op.is_mutating() {
                                        mutated = true;
                                    }
                                }
                                let failed = outcome.is_error();
                                record.tool_results.push(ToolResultRecord {
                                    call_id: call.call_id,
                                    outcome,
                                });
                                if failed {
                                    // Drop the rest of the batch; the
                                    // oracle replans from a fresh
                                    // observation.
                                    needs_observation = true;
                                    break;
                                }
                            }
                        }
                    }

                    // After a successful state change, let the page
                    // settle and fold the fresh observation into this
                    // step so the oracle's next context is current.
                    if mutated && !needs_observation {
                        if let Err(e) = self.settle(bridge, &mut tracker, &mut record).await {
                            trace.push(record);
                            return error_outcome("bridge", &e.to_string(), trace, usage);
                        }
                    }

                    trace.push(record);
                }
            }
        }
    }

    /// Take a snapshot and append the call/result pair to `record`.
    ///
    /// A remote-side snapshot failure is recorded, not fatal; the
    /// oracle sees it in the trace.
    async fn observe(
        &self,
        bridge: &ToolBridge,
        tracker: &mut SnapshotTracker,
        record: &mut StepRecord,
    ) -> Result<(), BridgeError> {
        let call_id = Uuid::new_v4().to_string();
        record.tool_calls.push(ToolCallRecord {
            call_id: call_id.clone(),
            tool_name: BridgeOp::Snapshot.remote_name().to_string(),
            args: serde_json::json!({}),
        });

        let outcome = bridge.invoke(BridgeOp::Snapshot, serde_json::json!({})).await?;
        if let ToolOutcome::Ok { payload } = &outcome {
            let snapshot = tracker.record(payload);
            debug!(
                "Observed generation {} with {} elements",
                snapshot.generation,
                snapshot.elements.len()
            );
        }
        record.tool_results.push(ToolResultRecord { call_id, outcome });
        Ok(())
    }

    /// Post-mutation settle: a short wait then a fresh snapshot, both
    /// folded into the acting step's record.
    async fn settle(
        &self,
        bridge: &ToolBridge,
        tracker: &mut SnapshotTracker,
        record: &mut StepRecord,
    ) -> Result<(), BridgeError> {
        let wait_id = Uuid::new_v4().to_string();
        let wait_args =
            serde_json::json!({ "time": self.policy.settle_delay_ms as f64 / 1000.0 });
        record.tool_calls.push(ToolCallRecord {
            call_id: wait_id.clone(),
            tool_name: BridgeOp::Wait.remote_name().to_string(),
            args: wait_args.clone(),
        });
        let outcome = bridge.invoke(BridgeOp::Wait, wait_args).await?;
        record.tool_results.push(ToolResultRecord {
            call_id: wait_id,
            outcome,
        });

        self.observe(bridge, tracker, record).await
    }
}

fn error_outcome(kind: &str, message: &str, trace: Vec<StepRecord>, usage: Usage) -> LoopOutcome {
    LoopOutcome {
        status: RunStatus::Error,
        report: None,
        raw_report: None,
        error: Some(RunError {
            kind: kind.to_string(),
            message: message.to_string(),
            retry_count: None,
        }),
        steps_taken: trace.len() as u32,
        trace,
        usage,
    }
}

fn timeout_outcome(trace: Vec<StepRecord>, usage: Usage) -> LoopOutcome {
    LoopOutcome {
        status: RunStatus::Timeout,
        report: None,
        raw_report: None,
        error: Some(RunError {
            kind: "timeout".to_string(),
            message: "Run exceeded its wall-clock budget".to_string(),
            retry_count: None,
        }),
        steps_taken: trace.len() as u32,
        trace,
        usage,
    }
}

#[cfg(test)]
#[path = "agent_loop_tests.rs"]
mod tests;
