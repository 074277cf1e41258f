//! The pluggable decision oracle interface.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::OracleError;
use crate::trace::{StepRecord, Usage};

/// A remote tool as presented to the oracle, taken from the bridge's
/// whitelisted catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema for the tool's arguments, as discovered from the
    /// remote provider.
    pub input_schema: serde_json::Value,
}

/// Everything the oracle sees when choosing the next action.
#[derive(Debug, Clone)]
pub struct DecisionContext {
    /// The behavioral policy instructions for this run.
    pub instructions: String,

    /// The task prompt built from the run's target URL.
    pub task: String,

    /// The whitelisted tool catalog.
    pub tools: Vec<ToolSpec>,

    /// The trace so far, oldest first.
    pub trace: Vec<StepRecord>,
}

/// One tool invocation proposed by the oracle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposedCall {
    /// Provider-assigned call id, used to pair the result back to this
    /// proposal in later context.
    pub call_id: String,
    pub name: String,
    pub args: serde_json::Value,
}

/// The oracle's choice: act, or finish.
#[derive(Debug, Clone)]
pub enum OracleDecision {
    /// Execute these tool invocations in order.
    ToolCalls(Vec<ProposedCall>),

    /// A terminal journey report candidate, not yet validated.
    FinalReport(serde_json::Value),
}

/// A full oracle reply, with telemetry for the trace.
#[derive(Debug, Clone)]
pub struct OracleReply {
    pub decision: OracleDecision,
    pub finish_reason: Option<String>,
    pub usage: Option<Usage>,
}

/// The pluggable next-action chooser.
///
/// The agent loop is written against this trait with deterministic test
/// doubles; production wiring to a model provider is a swappable
/// adapter.
#[async_trait]
pub trait DecisionOracle: Send + Sync {
    /// Identifier for diagnostics.
    fn id(&self) -> &str;

    /// Choose the next action (or the terminal report) given the
    /// instruction context and the trace so far.
    async fn decide(&self, ctx: &DecisionContext) -> Result<OracleReply, OracleError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoOracle;

    #[async_trait]
    impl DecisionOracle for EchoOracle {
        fn id(&self) -> &str {
            "echo"
        }

        async fn decide(&self, ctx: &DecisionContext) -> Result<OracleReply, OracleError> {
            Ok(OracleReply {
                decision: OracleDecision::FinalReport(serde_json::json!({
                    "task": ctx.task,
                })),
                finish_reason: Some("stop".to_string()),
                usage: None,
            })
        }
    }

    #[tokio::test]
    async fn test_oracle_trait_is_object_safe() {
        let oracle: Box<dyn DecisionOracle> = Box::new(EchoOracle);
        let ctx = DecisionContext {
            instructions: "instructions".to_string(),
            task: "visit https://example.com".to_string(),
            tools: Vec::new(),
            trace: Vec::new(),
        };
        let reply = oracle.decide(&ctx).await.unwrap();
        assert_eq!(oracle.id(), "echo");
        match reply.decision {
            OracleDecision::FinalReport(value) => {
                assert!(value["task"].as_str().unwrap().contains("example.com"));
            }
            _ => panic!("Expected FinalReport"),
        }
    }

    #[test]
    fn test_proposed_call_round_trip() {
        let call = ProposedCall {
            call_id: "call_1".to_string(),
            name: "browser_click".to_string(),
            args: serde_json::json!({ "ref": "s1e2" }),
        };
        let json = serde_json::to_string(&call).unwrap();
        let back: ProposedCall = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "browser_click");
        assert_eq!(back.args["ref"], "s1e2");
    }
}
