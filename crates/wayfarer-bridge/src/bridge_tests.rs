use super::*;
use async_trait::async_trait;
use std::sync::Mutex;

use crate::protocol::{RpcNotification, RpcRequest, RpcResponse};

/// Serves scripted results keyed by method, echoing the request id.
struct ScriptedTransport {
    results: Mutex<Vec<serde_json::Value>>,
}

impl ScriptedTransport {
    fn new(results: Vec<serde_json::Value>) -> Self {
        Self {
            results: Mutex::new(results),
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: RpcRequest) -> Result<RpcResponse, TransportError> {
        let mut results = self.results.lock().unwrap();
        if results.is_empty() {
            return Err(TransportError::Closed);
        }
        Ok(RpcResponse::success(request.id, results.remove(0)))
    }

    async fn notify(&self, _notification: RpcNotification) -> Result<(), TransportError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

fn init_result() -> serde_json::Value {
    serde_json::json!({
        "protocolVersion": "2025-03-26",
        "serverInfo": { "name": "playwright" }
    })
}

fn tool_entry(name: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "description": format!("The {name} tool"),
        "inputSchema": { "type": "object" }
    })
}

fn full_catalog() -> serde_json::Value {
    let mut tools: Vec<serde_json::Value> = BridgeOp::ALL
        .iter()
        .map(|op| tool_entry(op.remote_name()))
        .collect();
    // Remote providers ship far more; these must be filtered out.
    tools.push(tool_entry("browser_take_screenshot"));
    tools.push(tool_entry("browser_pdf_save"));
    serde_json::json!({ "tools": tools })
}

async fn open_bridge(extra: Vec<serde_json::Value>) -> ToolBridge {
    let mut results = vec![init_result(), full_catalog()];
    results.extend(extra);
    let transport = Arc::new(ScriptedTransport::new(results));
    ToolBridge::connect(transport).await.unwrap()
}

#[tokio::test]
async fn test_connect_filters_to_whitelist() {
    let bridge = open_bridge(vec![]).await;
    assert_eq!(bridge.catalog().len(), 7);
    assert!(bridge
        .catalog()
        .iter()
        .all(|tool| BridgeOp::from_remote_name(&tool.name).is_some()));
}

#[tokio::test]
async fn test_connect_fails_on_missing_whitelisted_tool() {
    let tools: Vec<serde_json::Value> = BridgeOp::ALL
        .iter()
        .filter(|op| **op != BridgeOp::Click)
        .map(|op| tool_entry(op.remote_name()))
        .collect();
    let results = vec![init_result(), serde_json::json!({ "tools": tools })];
    let transport = Arc::new(ScriptedTransport::new(results));

    let result = ToolBridge::connect(transport).await;
    assert!(
        matches!(result, Err(BridgeError::MissingTool(name)) if name == "browser_click")
    );
}

#[tokio::test]
async fn test_invoke_success() {
    let bridge = open_bridge(vec![serde_json::json!({
        "content": [{ "type": "text", "text": "- Page URL: https://example.com" }],
        "isError": false
    })])
    .await;

    let outcome = bridge
        .invoke(BridgeOp::Snapshot, serde_json::json!({}))
        .await
        .unwrap();
    match outcome {
        ToolOutcome::Ok { payload } => assert!(payload.contains("example.com")),
        _ => panic!("Expected Ok outcome"),
    }
}

#[tokio::test]
async fn test_invoke_remote_error_is_classified_not_thrown() {
    let bridge = open_bridge(vec![serde_json::json!({
        "content": [{ "type": "text", "text": "Error: ref s1e3 is stale, take a new snapshot" }],
        "isError": true
    })])
    .await;

    let outcome = bridge
        .invoke(BridgeOp::Click, serde_json::json!({ "ref": "s1e3" }))
        .await
        .unwrap();
    match outcome {
        ToolOutcome::Error { kind, .. } => assert_eq!(kind, ToolErrorKind::StaleReference),
        _ => panic!("Expected Error outcome"),
    }
}

#[tokio::test]
async fn test_close_is_idempotent_and_blocks_invoke() {
    let mut bridge = open_bridge(vec![]).await;
    bridge.close().await;
    assert!(bridge.is_closed());
    bridge.close().await;

    let result = bridge.invoke(BridgeOp::Snapshot, serde_json::json!({})).await;
    assert!(matches!(result, Err(BridgeError::Closed)));
}

#[test]
fn test_remote_name_round_trip() {
    for op in BridgeOp::ALL {
        assert_eq!(BridgeOp::from_remote_name(op.remote_name()), Some(op));
    }
    assert_eq!(BridgeOp::from_remote_name("browser_take_screenshot"), None);
}

#[test]
fn test_is_mutating() {
    assert!(BridgeOp::Navigate.is_mutating());
    assert!(BridgeOp::Click.is_mutating());
    assert!(BridgeOp::Type.is_mutating());
    assert!(BridgeOp::SelectOption.is_mutating());
    assert!(BridgeOp::Press.is_mutating());
    assert!(!BridgeOp::Snapshot.is_mutating());
    assert!(!BridgeOp::Wait.is_mutating());
}

#[test]
fn test_classify_remote_error() {
    assert_eq!(
        classify_remote_error("Element no longer exists in the page"),
        ToolErrorKind::StaleReference
    );
    assert_eq!(
        classify_remote_error("No element matched the given ref"),
        ToolErrorKind::ElementNotFound
    );
    assert_eq!(
        classify_remote_error("Element is not a select element"),
        ToolErrorKind::WrongElementType
    );
    assert_eq!(
        classify_remote_error("Timed out waiting for navigation"),
        ToolErrorKind::Other
    );
}

#[test]
fn test_bridge_config_for_endpoint() {
    let config = BridgeConfig::for_endpoint("ws://localhost:9222/devtools");
    assert_eq!(config.command, "npx");
    assert!(config
        .args
        .iter()
        .any(|arg| arg == "ws://localhost:9222/devtools"));
}
