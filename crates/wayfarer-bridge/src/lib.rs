//! # Wayfarer Bridge
//!
//! Adapts an open-ended, protocol-discovered remote browser tool
//! surface into the fixed seven-operation whitelist the agent loop is
//! allowed to use.
//!
//! Layers, bottom up:
//!
//! - [`protocol`] - JSON-RPC wire shapes
//! - [`transport`] - the stdio transport to the remote tool server
//! - [`client`] - handshake, tool discovery, tool invocation
//! - [`bridge`] - the whitelist adapter ([`ToolBridge`])
//! - [`snapshot`] - generation-tagged observation tracking

pub mod bridge;
pub mod client;
pub mod protocol;
pub mod snapshot;
pub mod transport;

pub use bridge::{BridgeConfig, BridgeError, BridgeOp, ToolBridge};
pub use client::{BridgeClient, ClientError};
pub use snapshot::{Snapshot, SnapshotElement, SnapshotTracker};
pub use transport::{StdioTransport, Transport, TransportError};
