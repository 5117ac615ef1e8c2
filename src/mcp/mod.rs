//! Model Context Protocol (MCP) server implementation.
//!
//! This module implements the MCP specification for exposing flight search
//! operations as tools to AI assistants, over either stdio (one session per
//! process) or HTTP (many sessions keyed by `Mcp-Session-Id`).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          MCP Server                          │
//! │                                                              │
//! │   ┌─────────────┐    ┌─────────────┐    ┌────────────────┐   │
//! │   │  Transport  │───▶│  McpServer  │───▶│ Tools/Prompts  │   │
//! │   │ stdio│http  │    │ (lifecycle) │    │   (dispatch)   │   │
//! │   └─────────────┘    └─────────────┘    └────────────────┘   │
//! │                                                 │            │
//! │                                                 ▼            │
//! │                                  ┌─────────────────────────┐ │
//! │                                  │ FlightService → provider│ │
//! │                                  └─────────────────────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Protocol Version
//!
//! Versions 2024-11-05, 2025-03-26 and 2025-06-18 are accepted.

pub mod http;
pub mod prompts;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod transport;

pub use http::{HttpState, SessionRegistry};
pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, MCP_PROTOCOL_VERSION};
pub use server::{McpServer, ServerInfo};
pub use transport::StdioTransport;

use tracing::{info, warn};

/// Completes when the process is asked to stop (SIGINT, SIGTERM, Ctrl+C).
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match (
        signal(SignalKind::interrupt()),
        signal(SignalKind::terminate()),
    ) {
        (Ok(mut sigint), Ok(mut sigterm)) => {
            tokio::select! {
                _ = sigint.recv() => info!("Received SIGINT, initiating graceful shutdown"),
                _ = sigterm.recv() => info!("Received SIGTERM, initiating graceful shutdown"),
            }
        }
        _ => {
            warn!("Failed to install signal handlers, falling back to Ctrl+C");
            ctrl_c().await;
        }
    }
}

/// Completes when the process is asked to stop (SIGINT, SIGTERM, Ctrl+C).
#[cfg(not(unix))]
pub async fn shutdown_signal() {
    ctrl_c().await;
}

async fn ctrl_c() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Received Ctrl+C, initiating graceful shutdown");
    } else {
        // without a handler the process can only end by EOF or being killed
        std::future::pending::<()>().await;
    }
}
