use super::*;

#[test]
fn test_request_serialization() {
    let request = RpcRequest::new(1i64, "tools/list");
    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["jsonrpc"], "2.0");
    assert_eq!(json["id"], 1);
    assert_eq!(json["method"], "tools/list");
    assert!(json.get("params").is_none());
}

#[test]
fn test_request_with_params() {
    let request = RpcRequest::new(2i64, "tools/call")
        .with_params(serde_json::json!({ "name": "browser_snapshot" }));
    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["params"]["name"], "browser_snapshot");
}

#[test]
fn test_notification_has_no_id() {
    let notification = RpcNotification::new("notifications/initialized");
    let json = serde_json::to_value(&notification).unwrap();
    assert!(json.get("id").is_none());
    assert_eq!(json["method"], "notifications/initialized");
}

#[test]
fn test_response_success() {
    let response = RpcResponse::success(1i64, serde_json::json!({ "tools": [] }));
    assert!(!response.is_error());
    assert!(response.result.is_some());
}

#[test]
fn test_response_error() {
    let response = RpcResponse::error(1i64, RpcError::method_not_found());
    assert!(response.is_error());
    assert_eq!(response.error.as_ref().unwrap().code, -32601);
}

#[test]
fn test_request_id_untagged() {
    let number: RequestId = serde_json::from_str("42").unwrap();
    assert_eq!(number, RequestId::Number(42));

    let string: RequestId = serde_json::from_str("\"abc\"").unwrap();
    assert_eq!(string, RequestId::String("abc".to_string()));
}

#[test]
fn test_method_strings() {
    assert_eq!(RpcMethod::Initialize.as_str(), "initialize");
    assert_eq!(RpcMethod::ListTools.as_str(), "tools/list");
    assert_eq!(RpcMethod::CallTool.as_str(), "tools/call");
}

#[test]
fn test_remote_tool_definition_deserializes_input_schema() {
    let json = serde_json::json!({
        "name": "browser_click",
        "description": "Click an element",
        "inputSchema": { "type": "object" }
    });
    let def: RemoteToolDefinition = serde_json::from_value(json).unwrap();
    assert_eq!(def.name, "browser_click");
    assert_eq!(def.input_schema["type"], "object");
}

#[test]
fn test_remote_call_result_text_concatenation() {
    let result = RemoteCallResult {
        content: vec![
            RemoteContent::Text {
                text: "Page URL: https://example.com".to_string(),
            },
            RemoteContent::Text {
                text: "- button \"Submit\" [ref=s1e2]".to_string(),
            },
        ],
        is_error: false,
    };
    let text = result.text();
    assert!(text.contains("example.com"));
    assert!(text.contains("s1e2"));
}

#[test]
fn test_remote_call_result_is_error_defaults_false() {
    let json = serde_json::json!({
        "content": [{ "type": "text", "text": "ok" }]
    });
    let result: RemoteCallResult = serde_json::from_value(json).unwrap();
    assert!(!result.is_error);
}

#[test]
fn test_remote_call_result_with_image_block_deserializes() {
    // Image blocks come over the wire with a camelCase mimeType; they
    // must parse (and be skipped by text()) rather than fail the call.
    let json = serde_json::json!({
        "content": [
            { "type": "image", "data": "aGVsbG8=", "mimeType": "image/png" },
            { "type": "text", "text": "done" }
        ],
        "isError": false
    });
    let result: RemoteCallResult = serde_json::from_value(json).unwrap();
    assert_eq!(result.content.len(), 2);
    match &result.content[0] {
        RemoteContent::Image { mime_type, .. } => assert_eq!(mime_type, "image/png"),
        _ => panic!("Expected an image block"),
    }
    assert_eq!(result.text(), "done");
}

#[test]
fn test_rpc_error_display_codes() {
    assert_eq!(RpcError::internal_error().code, -32603);
    assert_eq!(RpcError::new(-1, "custom").message, "custom");
}
