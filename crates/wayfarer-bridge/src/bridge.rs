//! The whitelist tool bridge.
//!
//! The remote tool surface is open-ended and provider-defined; this
//! adapter restricts it to a fixed seven-operation whitelist so the
//! action vocabulary stays closed and auditable regardless of how the
//! remote catalog evolves.

use std::sync::Arc;

use tracing::{debug, info, warn};

use wayfarer_protocols::oracle::ToolSpec;
use wayfarer_protocols::trace::{ToolErrorKind, ToolOutcome};

use crate::client::{BridgeClient, ClientError};
use crate::transport::{StdioTransport, Transport, TransportError};

/// The seven permitted bridge operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeOp {
    Navigate,
    Click,
    Type,
    SelectOption,
    Press,
    Snapshot,
    Wait,
}

impl BridgeOp {
    pub const ALL: [BridgeOp; 7] = [
        BridgeOp::Navigate,
        BridgeOp::Click,
        BridgeOp::Type,
        BridgeOp::SelectOption,
        BridgeOp::Press,
        BridgeOp::Snapshot,
        BridgeOp::Wait,
    ];

    /// The remote catalog name this operation maps to.
    pub fn remote_name(&self) -> &'static str {
        match self {
            BridgeOp::Navigate => "browser_navigate",
            BridgeOp::Click => "browser_click",
            BridgeOp::Type => "browser_type",
            BridgeOp::SelectOption => "browser_select_option",
            BridgeOp::Press => "browser_press_key",
            BridgeOp::Snapshot => "browser_snapshot",
            BridgeOp::Wait => "browser_wait_for",
        }
    }

    /// Reverse lookup from a remote tool name. `None` for anything
    /// outside the whitelist.
    pub fn from_remote_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.remote_name() == name)
    }

    /// Whether this operation changes page state (and so demands a
    /// fresh observation afterwards).
    pub fn is_mutating(&self) -> bool {
        !matches!(self, BridgeOp::Snapshot | BridgeOp::Wait)
    }
}

/// How to reach the remote tool server.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub command: String,
    pub args: Vec<String>,
}

impl BridgeConfig {
    /// The default Playwright tool server attached to an existing
    /// browser via its CDP endpoint.
    pub fn for_endpoint(cdp_endpoint: &str) -> Self {
        Self {
            command: "npx".to_string(),
            args: vec![
                "-y".to_string(),
                "@playwright/mcp@latest".to_string(),
                "--cdp-endpoint".to_string(),
                cdp_endpoint.to_string(),
            ],
        }
    }
}

/// Bridge failures. These are fatal to a run; expected remote-side
/// tool failures surface as [`ToolOutcome::Error`] instead.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Remote catalog is missing required tool: {0}")]
    MissingTool(String),

    #[error("Bridge is closed")]
    Closed,
}

/// A live session against the remote browser, restricted to the
/// whitelist. Exclusively owned by one agent loop for the run's
/// duration.
pub struct ToolBridge {
    client: Option<BridgeClient>,
    catalog: Vec<ToolSpec>,
}

impl ToolBridge {
    /// Spawn the tool server for a remote browser session and perform
    /// the handshake. Fails with a connection-class error if the
    /// process cannot spawn, the handshake fails, or a whitelisted
    /// operation is missing from the discovered catalog.
    pub async fn open(config: &BridgeConfig) -> Result<Self, BridgeError> {
        let transport = StdioTransport::spawn(&config.command, &config.args)
            .await
            .map_err(|e| BridgeError::Connection(e.to_string()))?;
        Self::connect(Arc::new(transport)).await
    }

    /// Perform the handshake and discovery over an already-open
    /// transport.
    pub async fn connect(transport: Arc<dyn Transport>) -> Result<Self, BridgeError> {
        let client = BridgeClient::new(transport);

        client
            .initialize()
            .await
            .map_err(|e| BridgeError::Connection(e.to_string()))?;

        let discovered = client.list_tools().await?;
        debug!("Remote catalog has {} tools", discovered.len());

        // Filter the open-ended catalog down to the whitelist; tools
        // outside it are never surfaced.
        let catalog: Vec<ToolSpec> = discovered
            .into_iter()
            .filter(|tool| BridgeOp::from_remote_name(&tool.name).is_some())
            .map(|tool| ToolSpec {
                name: tool.name,
                description: tool.description.unwrap_or_default(),
                input_schema: tool.input_schema,
            })
            .collect();

        for op in BridgeOp::ALL {
            if !catalog.iter().any(|tool| tool.name == op.remote_name()) {
                return Err(BridgeError::MissingTool(op.remote_name().to_string()));
            }
        }

        info!("Tool bridge open with {} whitelisted tools", catalog.len());
        Ok(Self {
            client: Some(client),
            catalog,
        })
    }

    /// The whitelisted tool catalog, for presenting to the oracle.
    pub fn catalog(&self) -> &[ToolSpec] {
        &self.catalog
    }

    /// Invoke one whitelisted operation.
    ///
    /// Expected remote-side failures (element not found, wrong element
    /// type, stale reference) come back as `Ok(ToolOutcome::Error)`;
    /// `Err` is reserved for transport collapse.
    pub async fn invoke(
        &self,
        op: BridgeOp,
        args: serde_json::Value,
    ) -> Result<ToolOutcome, BridgeError> {
        let client = self.client.as_ref().ok_or(BridgeError::Closed)?;

        let result = client.call_tool(op.remote_name(), args).await?;
        let text = result.text();

        if result.is_error {
            let kind = classify_remote_error(&text);
            debug!("Tool {} failed ({:?}): {}", op.remote_name(), kind, text);
            return Ok(ToolOutcome::Error {
                kind,
                message: text,
            });
        }

        Ok(ToolOutcome::Ok { payload: text })
    }

    /// Release the underlying transport and session. Idempotent and
    /// safe after partial failure.
    pub async fn close(&mut self) {
        if let Some(client) = self.client.take() {
            if let Err(e) = client.close().await {
                warn!("Error closing tool bridge: {}", e);
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.client.is_none()
    }
}

/// Map a remote error message onto the recoverable error taxonomy.
fn classify_remote_error(message: &str) -> ToolErrorKind {
    let lower = message.to_lowercase();
    if lower.contains("stale") || lower.contains("no longer exists") {
        ToolErrorKind::StaleReference
    } else if lower.contains("not found")
        || lower.contains("no element")
        || lower.contains("unable to find")
    {
        ToolErrorKind::ElementNotFound
    } else if lower.contains("not an")
        || lower.contains("not a ")
        || lower.contains("not editable")
        || lower.contains("not clickable")
    {
        ToolErrorKind::WrongElementType
    } else {
        ToolErrorKind::Other
    }
}

#[cfg(test)]
#[path = "bridge_tests.rs"]
mod tests;
