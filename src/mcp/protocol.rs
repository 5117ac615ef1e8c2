//! JSON-RPC 2.0 framing for MCP.
//!
//! Only the subset the server needs: single (non-batch) requests and
//! notifications in, results and errors out.
//!
//! - **Request**: has an `id`, gets exactly one reply
//! - **Notification**: no `id`, never replied to
//!
//! MCP forbids `null` request IDs, so [`RequestId`] is a string or an integer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The newest MCP protocol version this implementation speaks.
pub const MCP_PROTOCOL_VERSION: &str = "2025-06-18";

/// Every protocol version accepted during `initialize`, oldest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: [&str; 3] =
    ["2024-11-05", "2025-03-26", MCP_PROTOCOL_VERSION];

/// Body is not JSON.
pub const PARSE_ERROR: i32 = -32700;
/// JSON, but not a usable request or notification.
pub const INVALID_REQUEST: i32 = -32600;
/// No handler for the method.
pub const METHOD_NOT_FOUND: i32 = -32601;
/// Params missing or of the wrong shape.
pub const INVALID_PARAMS: i32 = -32602;
/// The server failed while answering.
pub const INTERNAL_ERROR: i32 = -32603;
/// Requests that arrive without a usable session.
pub const SESSION_ERROR_CODE: i32 = -32000;

/// Picks the protocol version to answer `initialize` with.
///
/// The client's version is echoed when supported; otherwise the newest
/// supported version is offered and the client decides whether to continue.
#[must_use]
pub fn negotiate_version(requested: Option<&str>) -> &'static str {
    requested
        .and_then(|v| SUPPORTED_PROTOCOL_VERSIONS.iter().find(|s| **s == v))
        .copied()
        .unwrap_or(MCP_PROTOCOL_VERSION)
}

/// A request ID, echoed back in the reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric ID.
    Number(i64),
    /// String ID.
    String(String),
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// An incoming request.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    /// Echoed in the reply.
    pub id: RequestId,
    /// Method to invoke.
    pub method: String,
    /// Method parameters, if any.
    #[serde(default)]
    pub params: Option<Value>,
}

/// An incoming notification.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcNotification {
    /// Notification name.
    pub method: String,
}

/// A successful reply.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    jsonrpc: &'static str,
    /// ID of the request being answered.
    pub id: RequestId,
    /// Method result.
    pub result: Value,
}

impl JsonRpcResponse {
    /// Wraps `result` as the reply to `id`.
    #[must_use]
    pub const fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result,
        }
    }
}

/// The `error` member of an error reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorObject {
    /// One of the codes defined in this module.
    pub code: i32,
    /// Human-readable description.
    pub message: String,
}

/// An error reply.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    jsonrpc: &'static str,
    /// ID of the failed request; absent when it could not be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    /// Code and message.
    pub error: ErrorObject,
}

impl JsonRpcError {
    /// An error reply with an explicit code and message.
    #[must_use]
    pub fn new(id: Option<RequestId>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            error: ErrorObject {
                code,
                message: message.into(),
            },
        }
    }

    /// The body was not JSON.
    #[must_use]
    pub fn parse_error() -> Self {
        Self::new(None, PARSE_ERROR, "Parse error")
    }

    /// The message is JSON but not a valid request or notification.
    #[must_use]
    pub fn invalid_request(id: Option<RequestId>, message: impl Into<String>) -> Self {
        Self::new(id, INVALID_REQUEST, message)
    }

    /// No handler for `method`.
    #[must_use]
    pub fn method_not_found(id: RequestId, method: &str) -> Self {
        Self::new(
            Some(id),
            METHOD_NOT_FOUND,
            format!("Method not found: {method}"),
        )
    }

    /// The params could not be used.
    #[must_use]
    pub fn invalid_params(id: RequestId, message: impl Into<String>) -> Self {
        Self::new(Some(id), INVALID_PARAMS, message)
    }

    /// The server failed while answering.
    #[must_use]
    pub fn internal_error(id: RequestId, message: impl Into<String>) -> Self {
        Self::new(Some(id), INTERNAL_ERROR, message)
    }

    /// The message carried no valid session (HTTP transport).
    #[must_use]
    pub fn no_valid_session(id: Option<RequestId>) -> Self {
        Self::new(
            id,
            SESSION_ERROR_CODE,
            "Bad Request: No valid session ID provided",
        )
    }

    /// This error as a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// A decoded incoming message.
#[derive(Debug, Clone)]
pub enum IncomingMessage {
    /// Expects a reply.
    Request(JsonRpcRequest),
    /// Never replied to.
    Notification(JsonRpcNotification),
}

impl IncomingMessage {
    /// The method name.
    #[must_use]
    pub fn method(&self) -> &str {
        match self {
            Self::Request(req) => &req.method,
            Self::Notification(notif) => &notif.method,
        }
    }

    /// The request ID, for requests.
    #[must_use]
    pub const fn id(&self) -> Option<&RequestId> {
        match self {
            Self::Request(req) => Some(&req.id),
            Self::Notification(_) => None,
        }
    }

    /// Whether this is an `initialize` request (the only message allowed to
    /// open an HTTP session).
    #[must_use]
    pub fn is_initialize(&self) -> bool {
        matches!(self, Self::Request(req) if req.method == "initialize")
    }
}

/// Decodes one raw message.
///
/// # Errors
///
/// Parse error for malformed JSON, invalid request otherwise
/// (see [`parse_value`]).
pub fn parse_message(json: &str) -> Result<IncomingMessage, JsonRpcError> {
    let value: Value = serde_json::from_str(json).map_err(|_| JsonRpcError::parse_error())?;
    parse_value(value)
}

/// Interprets decoded JSON as a request or notification.
///
/// # Errors
///
/// Returns an invalid-request error when the value is not an object (batches
/// included), `jsonrpc` is not `"2.0"`, the method is missing or empty, or
/// the ID is neither a string nor an integer.
pub fn parse_value(value: Value) -> Result<IncomingMessage, JsonRpcError> {
    let Value::Object(obj) = value else {
        return Err(JsonRpcError::invalid_request(
            None,
            "Invalid Request: expected a single JSON-RPC object",
        ));
    };

    // the ID is echoed in later errors when it can be read
    let id = obj
        .get("id")
        .and_then(|id| serde_json::from_value::<RequestId>(id.clone()).ok());

    if obj.get("jsonrpc").and_then(Value::as_str) != Some("2.0") {
        return Err(JsonRpcError::invalid_request(
            id,
            "Invalid Request: jsonrpc must be \"2.0\"",
        ));
    }
    if !obj
        .get("method")
        .and_then(Value::as_str)
        .is_some_and(|m| !m.is_empty())
    {
        return Err(JsonRpcError::invalid_request(
            id,
            "Invalid Request: method must be a non-empty string",
        ));
    }

    if obj.contains_key("id") {
        decode(obj, id).map(IncomingMessage::Request)
    } else {
        decode(obj, None).map(IncomingMessage::Notification)
    }
}

fn decode<T: serde::de::DeserializeOwned>(
    obj: Map<String, Value>,
    id: Option<RequestId>,
) -> Result<T, JsonRpcError> {
    serde_json::from_value(Value::Object(obj))
        .map_err(|e| JsonRpcError::invalid_request(id, format!("Invalid Request: {e}")))
}
