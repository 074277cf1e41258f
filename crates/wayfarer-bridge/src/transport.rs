//! Transport layer for the remote tool protocol.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::Mutex;
use tracing::debug;

use crate::protocol::{RpcNotification, RpcRequest, RpcResponse};

/// Transport trait for the remote tool protocol.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and wait for the matching response.
    async fn send(&self, request: RpcRequest) -> Result<RpcResponse, TransportError>;

    /// Send a one-way notification.
    async fn notify(&self, notification: RpcNotification) -> Result<(), TransportError>;

    /// Close the transport. Idempotent.
    async fn close(&self) -> Result<(), TransportError>;
}

/// Transport errors.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Process error: {0}")]
    Process(String),

    #[error("Connection closed")]
    Closed,
}

/// Stdio transport for a subprocess tool server.
///
/// Speaks newline-delimited JSON-RPC over the child's stdin/stdout.
pub struct StdioTransport {
    child: Mutex<Option<Child>>,
    stdin: Mutex<Option<tokio::process::ChildStdin>>,
    stdout: Mutex<Option<BufReader<tokio::process::ChildStdout>>>,
}

impl StdioTransport {
    /// Spawn the tool server process and capture its pipes.
    pub async fn spawn(command: &str, args: &[String]) -> Result<Self, TransportError> {
        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TransportError::Process("Failed to capture stdin".to_string()))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TransportError::Process("Failed to capture stdout".to_string()))?;

        Ok(Self {
            child: Mutex::new(Some(child)),
            stdin: Mutex::new(Some(stdin)),
            stdout: Mutex::new(Some(BufReader::new(stdout))),
        })
    }

    async fn write_line(
        stdin: &mut tokio::process::ChildStdin,
        json: &str,
    ) -> Result<(), TransportError> {
        stdin.write_all(json.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
        stdin.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl Transport for StdioTransport {
    async fn send(&self, request: RpcRequest) -> Result<RpcResponse, TransportError> {
        let mut stdin_guard = self.stdin.lock().await;
        let stdin = stdin_guard.as_mut().ok_or(TransportError::Closed)?;

        let mut stdout_guard = self.stdout.lock().await;
        let stdout = stdout_guard.as_mut().ok_or(TransportError::Closed)?;

        let json = serde_json::to_string(&request)?;
        Self::write_line(stdin, &json).await?;

        // The server may interleave its own notifications with the
        // response; skip lines until the matching response id appears.
        loop {
            let mut line = String::new();
            let read = stdout.read_line(&mut line).await?;
            if read == 0 {
                return Err(TransportError::Closed);
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<RpcResponse>(trimmed) {
                Ok(response) if response.id == request.id => return Ok(response),
                Ok(response) => {
                    debug!("Skipping response for unrelated id: {:?}", response.id);
                }
                Err(_) => {
                    debug!("Skipping non-response line from tool server");
                }
            }
        }
    }

    async fn notify(&self, notification: RpcNotification) -> Result<(), TransportError> {
        let mut stdin_guard = self.stdin.lock().await;
        let stdin = stdin_guard.as_mut().ok_or(TransportError::Closed)?;

        let json = serde_json::to_string(&notification)?;
        Self::write_line(stdin, &json).await
    }

    async fn close(&self) -> Result<(), TransportError> {
        *self.stdin.lock().await = None;
        *self.stdout.lock().await = None;

        if let Some(mut child) = self.child.lock().await.take() {
            child.kill().await?;
        }

        Ok(())
    }
}
