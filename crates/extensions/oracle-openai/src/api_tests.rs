use super::*;

#[test]
fn test_request_skips_empty_optionals() {
    let request = ApiRequest {
        model: "gpt-4.1-mini".to_string(),
        messages: vec![ApiMessage::text("user", "hello")],
        max_tokens: None,
        temperature: None,
        tools: Vec::new(),
    };
    let json = serde_json::to_value(&request).unwrap();
    assert!(json.get("max_tokens").is_none());
    assert!(json.get("temperature").is_none());
    assert!(json.get("tools").is_none());
    assert_eq!(json["messages"][0]["role"], "user");
}

#[test]
fn test_request_serializes_tools() {
    let request = ApiRequest {
        model: "gpt-4.1-mini".to_string(),
        messages: Vec::new(),
        max_tokens: Some(20000),
        temperature: Some(0.1),
        tools: vec![ApiTool {
            tool_type: "function".to_string(),
            function: FunctionDef {
                name: "browser_click".to_string(),
                description: "Click an element".to_string(),
                parameters: serde_json::json!({ "type": "object" }),
            },
        }],
    };
    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["tools"][0]["type"], "function");
    assert_eq!(json["tools"][0]["function"]["name"], "browser_click");
    assert_eq!(json["max_tokens"], 20000);
}

#[test]
fn test_assistant_message_with_tool_calls_round_trip() {
    let message = ApiMessage {
        role: "assistant".to_string(),
        content: None,
        tool_calls: Some(vec![ToolCall {
            id: "call_1".to_string(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: "browser_navigate".to_string(),
                arguments: r#"{"url":"https://example.com"}"#.to_string(),
            },
        }]),
        tool_call_id: None,
    };
    let json = serde_json::to_string(&message).unwrap();
    let back: ApiMessage = serde_json::from_str(&json).unwrap();
    let calls = back.tool_calls.unwrap();
    assert_eq!(calls[0].function.name, "browser_navigate");
    assert!(calls[0].function.arguments.contains("example.com"));
}

#[test]
fn test_response_parses_tool_calls() {
    let body = serde_json::json!({
        "id": "chatcmpl-1",
        "model": "gpt-4.1-mini",
        "choices": [{
            "index": 0,
            "message": {
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_1",
                    "type": "function",
                    "function": { "name": "browser_snapshot", "arguments": "{}" }
                }]
            },
            "finish_reason": "tool_calls"
        }],
        "usage": { "prompt_tokens": 100, "completion_tokens": 10, "total_tokens": 110 }
    });
    let response: ApiResponse = serde_json::from_value(body).unwrap();
    assert_eq!(response.choices.len(), 1);
    assert_eq!(response.choices[0].message.tool_calls.len(), 1);
    assert_eq!(response.usage.unwrap().total_tokens, 110);
}

#[test]
fn test_response_tolerates_missing_tool_calls() {
    let body = serde_json::json!({
        "id": "chatcmpl-2",
        "model": "gpt-4.1-mini",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": "{\"finalUrl\": \"x\"}" },
            "finish_reason": "stop"
        }],
        "usage": null
    });
    let response: ApiResponse = serde_json::from_value(body).unwrap();
    assert!(response.choices[0].message.tool_calls.is_empty());
    assert!(response.usage.is_none());
}
