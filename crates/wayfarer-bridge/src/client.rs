//! Handshake, discovery and invocation client for the remote tool
//! server.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::protocol::{
    RemoteCallResult, RemoteToolDefinition, RpcMethod, RpcNotification, RpcRequest, RpcResponse,
};
use crate::transport::{Transport, TransportError};

const PROTOCOL_VERSION: &str = "2025-03-26";

/// Client for one remote tool server session.
pub struct BridgeClient {
    transport: Arc<dyn Transport>,
    request_id: AtomicI64,
}

impl BridgeClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            request_id: AtomicI64::new(1),
        }
    }

    fn next_id(&self) -> i64 {
        self.request_id.fetch_add(1, Ordering::SeqCst)
    }

    async fn request(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<RpcResponse, ClientError> {
        let id = self.next_id();
        let mut request = RpcRequest::new(id, method);
        if let Some(p) = params {
            request = request.with_params(p);
        }

        debug!("Sending bridge request: {} (id={})", method, id);

        let response = self.transport.send(request).await?;

        if let Some(err) = response.error {
            return Err(ClientError::Server {
                code: err.code,
                message: err.message,
            });
        }

        Ok(response)
    }

    /// Perform the protocol handshake.
    pub async fn initialize(&self) -> Result<serde_json::Value, ClientError> {
        let params = serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "clientInfo": {
                "name": "wayfarer",
                "version": env!("CARGO_PKG_VERSION")
            }
        });

        let response = self
            .request(RpcMethod::Initialize.as_str(), Some(params))
            .await?;
        let result = response.result.unwrap_or(serde_json::Value::Null);

        self.transport
            .notify(RpcNotification::new("notifications/initialized"))
            .await?;

        info!("Bridge session initialized");
        Ok(result)
    }

    /// Discover the remote tool catalog.
    pub async fn list_tools(&self) -> Result<Vec<RemoteToolDefinition>, ClientError> {
        let response = self.request(RpcMethod::ListTools.as_str(), None).await?;
        let result = response.result.unwrap_or(serde_json::Value::Null);

        let tools: Vec<RemoteToolDefinition> = result
            .get("tools")
            .and_then(|t| serde_json::from_value(t.clone()).ok())
            .unwrap_or_default();

        Ok(tools)
    }

    /// Invoke one remote tool.
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<RemoteCallResult, ClientError> {
        let params = serde_json::json!({
            "name": name,
            "arguments": arguments
        });

        let response = self
            .request(RpcMethod::CallTool.as_str(), Some(params))
            .await?;
        let result = response.result.unwrap_or(serde_json::Value::Null);

        let call_result: RemoteCallResult =
            serde_json::from_value(result).map_err(|e| ClientError::Protocol(e.to_string()))?;

        Ok(call_result)
    }

    /// Close the underlying transport.
    pub async fn close(&self) -> Result<(), ClientError> {
        self.transport.close().await?;
        Ok(())
    }
}

/// Client errors.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Server error ({code}): {message}")]
    Server { code: i32, message: String },

    #[error("Protocol error: {0}")]
    Protocol(String),
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
