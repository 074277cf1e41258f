//! Conversion between the oracle contract and the chat-completions
//! wire format.

use wayfarer_protocols::error::OracleError;
use wayfarer_protocols::oracle::{DecisionContext, OracleDecision, ProposedCall, ToolSpec};
use wayfarer_protocols::trace::{StepRecord, ToolOutcome};

use crate::api::{ApiMessage, ApiTool, FunctionDef, ResponseMessage};

/// Build the full message history for a decision request: system
/// instructions, the task prompt, then one assistant/tool exchange per
/// recorded step.
pub fn build_messages(ctx: &DecisionContext) -> Vec<ApiMessage> {
    let mut messages = vec![
        ApiMessage::text("system", ctx.instructions.clone()),
        ApiMessage::text("user", ctx.task.clone()),
    ];
    for step in &ctx.trace {
        append_step(&mut messages, step);
    }
    messages
}

fn append_step(messages: &mut Vec<ApiMessage>, step: &StepRecord) {
    if step.tool_calls.is_empty() {
        // Steps without calls are rejected-report or malformed-reply
        // markers; turn them into corrective feedback.
        match step.finish_reason.as_deref() {
            Some("invalid_report") => messages.push(ApiMessage::text(
                "user",
                "Your previous final report was invalid. Reply with a single valid JSON object \
                 with keys siteDescription, journey, stepsSummary and finalUrl.",
            )),
            Some("malformed_response") => messages.push(ApiMessage::text(
                "user",
                "Your previous reply could not be parsed. Either call exactly one tool or reply \
                 with the final JSON report object.",
            )),
            _ => {}
        }
        return;
    }

    let tool_calls = step
        .tool_calls
        .iter()
        .map(|call| crate::api::ToolCall {
            id: call.call_id.clone(),
            call_type: "function".to_string(),
            function: crate::api::FunctionCall {
                name: call.tool_name.clone(),
                arguments: call.args.to_string(),
            },
        })
        .collect();

    messages.push(ApiMessage {
        role: "assistant".to_string(),
        content: None,
        tool_calls: Some(tool_calls),
        tool_call_id: None,
    });

    for result in &step.tool_results {
        messages.push(ApiMessage {
            role: "tool".to_string(),
            content: Some(outcome_text(&result.outcome)),
            tool_calls: None,
            tool_call_id: Some(result.call_id.clone()),
        });
    }

    // The API requires a tool message for every proposed call; calls
    // dropped mid-batch get a placeholder so the history stays legal.
    for call in &step.tool_calls {
        if !step.tool_results.iter().any(|r| r.call_id == call.call_id) {
            messages.push(ApiMessage {
                role: "tool".to_string(),
                content: Some("Not executed: an earlier call in this step failed.".to_string()),
                tool_calls: None,
                tool_call_id: Some(call.call_id.clone()),
            });
        }
    }
}

fn outcome_text(outcome: &ToolOutcome) -> String {
    match outcome {
        ToolOutcome::Ok { payload } => payload.clone(),
        ToolOutcome::Error { message, .. } => format!("Error: {message}"),
    }
}

/// Convert the whitelisted catalog into API tool definitions.
pub fn build_tools(tools: &[ToolSpec]) -> Vec<ApiTool> {
    tools
        .iter()
        .map(|tool| ApiTool {
            tool_type: "function".to_string(),
            function: FunctionDef {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.input_schema.clone(),
            },
        })
        .collect()
}

/// Interpret an assistant message as a decision: tool calls if any
/// were proposed, otherwise the content must parse as the terminal
/// report candidate.
pub fn parse_decision(message: &ResponseMessage) -> Result<OracleDecision, OracleError> {
    if !message.tool_calls.is_empty() {
        let calls = message
            .tool_calls
            .iter()
            .map(|call| {
                let args: serde_json::Value = serde_json::from_str(&call.function.arguments)
                    .map_err(|e| {
                        OracleError::MalformedResponse(format!(
                            "Tool call {} has unparsable arguments: {e}",
                            call.function.name
                        ))
                    })?;
                Ok(ProposedCall {
                    call_id: call.id.clone(),
                    name: call.function.name.clone(),
                    args,
                })
            })
            .collect::<Result<Vec<_>, OracleError>>()?;
        return Ok(OracleDecision::ToolCalls(calls));
    }

    let content = message
        .content
        .as_deref()
        .ok_or_else(|| OracleError::MalformedResponse("Reply had no content".to_string()))?;
    let candidate = strip_code_fences(content);
    let value: serde_json::Value = serde_json::from_str(candidate).map_err(|e| {
        OracleError::MalformedResponse(format!("Reply is not a JSON report candidate: {e}"))
    })?;
    Ok(OracleDecision::FinalReport(value))
}

/// Strip a surrounding markdown code fence, if present.
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
