//! MCP server implementation for flight search.
//!
//! This module implements the MCP server lifecycle:
//!
//! 1. **Initialisation**: Capability negotiation and version agreement
//! 2. **Operation**: Handling tool calls, prompt requests and pings
//! 3. **Shutdown**: Graceful connection termination
//!
//! An [`McpServer`] holds the state of one client connection and knows
//! nothing about transports: it turns an incoming message into an optional
//! reply. The stdio loop and the HTTP session registry both drive it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use crate::config::{Config, DEFAULT_SERVER_NAME};
use crate::flights::FlightService;
use crate::mcp::prompts;
use crate::mcp::protocol::{
    negotiate_version, parse_message, IncomingMessage, JsonRpcError, JsonRpcNotification,
    JsonRpcRequest, JsonRpcResponse, RequestId,
};
use crate::mcp::tools;
use crate::mcp::transport::StdioTransport;

/// Server state in the MCP lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Waiting for initialize request.
    AwaitingInit,
    /// Initialize received, waiting for initialized notification.
    Initialising,
    /// Ready for normal operation.
    Running,
    /// Connection closed; no further messages are served.
    ShuttingDown,
}

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    /// Tool-related capabilities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ListCapabilities>,
    /// Prompt-related capabilities.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompts: Option<ListCapabilities>,
}

impl Default for ServerCapabilities {
    fn default() -> Self {
        Self {
            tools: Some(ListCapabilities::default()),
            prompts: Some(ListCapabilities::default()),
        }
    }
}

/// Capabilities of a listable primitive (tools, prompts).
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListCapabilities {
    /// Whether the list can change during the session.
    #[serde(rename = "listChanged", skip_serializing_if = "is_false")]
    pub list_changed: bool,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde's skip_serializing_if passes &T
const fn is_false(b: &bool) -> bool {
    !*b
}

/// Server information for initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: DEFAULT_SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl From<&Config> for ServerInfo {
    fn from(config: &Config) -> Self {
        Self {
            name: config.server.name.clone(),
            version: config.server.version.clone(),
        }
    }
}

/// Client information received during initialisation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    /// Client name.
    pub name: String,
    /// Client version.
    #[serde(default)]
    pub version: Option<String>,
}

/// Parameters for the initialize request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version requested by client.
    pub protocol_version: String,
    /// Client capabilities.
    #[serde(default)]
    pub capabilities: Value,
    /// Client information.
    #[serde(default)]
    pub client_info: Option<ClientInfo>,
}

/// A tool definition for tools/list response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

/// Parameters for tools/call request.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call.
    pub name: String,
    /// Arguments for the tool.
    #[serde(default)]
    pub arguments: Value,
}

/// Parameters for prompts/get request.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptGetParams {
    /// Name of the prompt.
    pub name: String,
    /// Template arguments; absent or `null` means none.
    #[serde(default)]
    pub arguments: Option<Map<String, Value>>,
}

/// Content item in a tool call response.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Result of a tool call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Whether the tool call resulted in an error.
    #[serde(skip_serializing_if = "is_false")]
    pub is_error: bool,
}

impl ToolCallResult {
    /// Creates a successful text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Creates an error text result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }
}

/// One MCP client connection.
pub struct McpServer {
    /// Current server state.
    state: ServerState,
    /// Negotiated protocol version (set after initialisation).
    protocol_version: Option<String>,
    /// Identity reported to the client.
    info: ServerInfo,
    /// The flight-search pipeline, shared across connections.
    flights: Arc<FlightService>,
}

impl McpServer {
    /// Creates a server for one connection.
    #[must_use]
    pub fn new(info: ServerInfo, flights: Arc<FlightService>) -> Self {
        Self {
            state: ServerState::AwaitingInit,
            protocol_version: None,
            info,
            flights,
        }
    }

    /// Returns the current server state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// Returns the negotiated protocol version, once initialised.
    #[must_use]
    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }

    /// Marks the connection closed. Later requests are refused.
    pub fn close(&mut self) {
        self.state = ServerState::ShuttingDown;
    }

    /// Runs the stdio main loop until EOF or a shutdown signal.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run_stdio(&mut self, transport: &mut StdioTransport) -> std::io::Result<()> {
        let shutdown = crate::mcp::shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    self.close();
                    return Ok(());
                }

                line_result = transport.read_line() => {
                    let Some(line) = line_result? else {
                        debug!("stdin closed");
                        self.close();
                        return Ok(());
                    };

                    if line.trim().is_empty() {
                        continue;
                    }

                    if let Some(reply) = self.handle_line(&line).await {
                        transport.write_json(&reply).await?;
                    }
                }
            }
        }
    }

    /// Handles one raw message; parse failures become error replies.
    pub async fn handle_line(&mut self, line: &str) -> Option<Value> {
        match parse_message(line) {
            Ok(msg) => self.handle_message(msg).await,
            Err(error) => Some(error.to_value()),
        }
    }

    /// Handles a parsed incoming message.
    ///
    /// Returns the reply for requests and `None` for notifications.
    pub async fn handle_message(&mut self, msg: IncomingMessage) -> Option<Value> {
        match msg {
            IncomingMessage::Request(req) => Some(self.handle_request(req).await),
            IncomingMessage::Notification(ref notif) => {
                self.handle_notification(notif);
                None
            }
        }
    }

    /// Handles an incoming request.
    async fn handle_request(&mut self, req: JsonRpcRequest) -> Value {
        debug!(id = %req.id, method = %req.method, "Handling request");
        let response = match req.method.as_str() {
            "initialize" => self.handle_initialize(&req),
            "ping" => Ok(Self::handle_ping(&req)),
            "tools/list" => self.handle_tools_list(&req),
            "tools/call" => self.handle_tools_call(&req).await,
            "prompts/list" => self.handle_prompts_list(&req),
            "prompts/get" => self.handle_prompts_get(&req),
            _ => Err(JsonRpcError::method_not_found(req.id.clone(), &req.method)),
        };

        match response {
            Ok(resp) => serde_json::to_value(&resp).unwrap_or(Value::Null),
            Err(error) => error.to_value(),
        }
    }

    /// Handles an incoming notification.
    fn handle_notification(&mut self, notif: &JsonRpcNotification) {
        if notif.method == "notifications/initialized" && self.state == ServerState::Initialising {
            self.state = ServerState::Running;
        } else {
            debug!(method = %notif.method, "Ignoring notification");
        }
    }

    /// Handles the initialize request.
    fn handle_initialize(&mut self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        if self.state != ServerState::AwaitingInit {
            return Err(JsonRpcError::invalid_request(
                Some(req.id.clone()),
                "Server already initialised",
            ));
        }

        let params: InitializeParams = parse_params(req, "initialize")?;

        let negotiated_version = negotiate_version(Some(&params.protocol_version));
        info!(
            client = params.client_info.as_ref().map_or("unknown", |c| c.name.as_str()),
            requested = %params.protocol_version,
            negotiated = negotiated_version,
            "Client initialising"
        );

        self.protocol_version = Some(negotiated_version.to_string());
        self.state = ServerState::Initialising;

        let result = json!({
            "protocolVersion": negotiated_version,
            "capabilities": ServerCapabilities::default(),
            "serverInfo": self.info,
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Handles the tools/list request.
    fn handle_tools_list(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_initialised(&req.id)?;

        let result = json!({
            "tools": tools::tool_definitions(),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Handles the tools/call request.
    async fn handle_tools_call(
        &self,
        req: &JsonRpcRequest,
    ) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_initialised(&req.id)?;

        let params: ToolCallParams = parse_params(req, "tool call")?;
        let result = tools::call_tool(&self.flights, &params.name, &params.arguments).await;

        let result_value = serde_json::to_value(&result).map_err(|e| {
            tracing::error!(error = %e, "Failed to serialise tool call result");
            JsonRpcError::internal_error(
                req.id.clone(),
                "Internal error: failed to serialise result",
            )
        })?;

        Ok(JsonRpcResponse::success(req.id.clone(), result_value))
    }

    /// Handles the prompts/list request.
    fn handle_prompts_list(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_initialised(&req.id)?;

        let result = json!({
            "prompts": prompts::prompt_definitions(),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Handles the prompts/get request.
    fn handle_prompts_get(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_initialised(&req.id)?;

        let params: PromptGetParams = parse_params(req, "prompt")?;
        let prompt = prompts::get_prompt(&params.name, &params.arguments.unwrap_or_default())
            .map_err(|e| JsonRpcError::invalid_params(req.id.clone(), e.to_string()))?;

        let result = serde_json::to_value(&prompt).map_err(|e| {
            JsonRpcError::internal_error(req.id.clone(), format!("Failed to serialise prompt: {e}"))
        })?;

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    /// Handles the ping request.
    fn handle_ping(req: &JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::success(req.id.clone(), json!({}))
    }

    /// Ensures `initialize` has been answered and the connection is open.
    fn require_initialised(&self, id: &RequestId) -> Result<(), JsonRpcError> {
        match self.state {
            ServerState::Initialising | ServerState::Running => Ok(()),
            ServerState::AwaitingInit => Err(JsonRpcError::invalid_request(
                Some(id.clone()),
                "Server not initialised",
            )),
            ServerState::ShuttingDown => Err(JsonRpcError::invalid_request(
                Some(id.clone()),
                "Session closed",
            )),
        }
    }
}

/// Decodes the params of `req`, which must be present.
fn parse_params<T: serde::de::DeserializeOwned>(
    req: &JsonRpcRequest,
    what: &str,
) -> Result<T, JsonRpcError> {
    req.params
        .as_ref()
        .map(|p| serde_json::from_value(p.clone()))
        .transpose()
        .map_err(|e| {
            JsonRpcError::invalid_params(req.id.clone(), format!("Invalid {what} params: {e}"))
        })?
        .ok_or_else(|| {
            JsonRpcError::invalid_params(req.id.clone(), format!("Missing {what} params"))
        })
}
