//! HTTP transport (Streamable HTTP style).
//!
//! Each client gets its own [`McpServer`], created by an `initialize` request
//! without a session header and addressed afterwards through the
//! `Mcp-Session-Id` header.
//!
//! | Route | Behaviour |
//! |-------|-----------|
//! | `POST /mcp` | one JSON-RPC message; 200 with reply, 202 for notifications |
//! | `GET /mcp` | 405 for a valid session (no server-initiated stream) |
//! | `DELETE /mcp` | closes the session |
//! | `GET /health` | liveness plus active session count |
//! | `GET /` | server metadata |
//!
//! Messages without a usable session get 400 and never create one.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE,
};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::flights::FlightService;
use crate::mcp::prompts::prompt_definitions;
use crate::mcp::protocol::{
    parse_value, IncomingMessage, JsonRpcError, RequestId, SESSION_ERROR_CODE,
};
use crate::mcp::server::{McpServer, ServerInfo, ServerState};
use crate::mcp::tools::TOOL_NAMES;

/// Header carrying the session ID (lower case, as stored by `http`).
pub const SESSION_HEADER: &str = "mcp-session-id";

/// Path of the MCP endpoint.
pub const MCP_PATH: &str = "/mcp";

/// A session's server, locked while one message is processed.
pub type SessionHandle = Arc<Mutex<McpServer>>;

/// Live sessions keyed by session ID.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `server` under a fresh UUID v4 and returns the ID.
    pub async fn create(&self, server: McpServer) -> String {
        let id = Uuid::new_v4().to_string();
        self.sessions
            .write()
            .await
            .insert(id.clone(), Arc::new(Mutex::new(server)));
        info!(session_id = %id, "Session created");
        id
    }

    /// Looks a session up.
    pub async fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Closes and removes a session. Returns `false` if it did not exist.
    pub async fn remove(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id);
        match removed {
            Some(server) => {
                server.lock().await.close();
                info!(session_id = %id, "Session closed");
                true
            }
            None => false,
        }
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether no session is live.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Closes and removes every session. Returns how many were closed.
    pub async fn close_all(&self) -> usize {
        let drained: Vec<(String, SessionHandle)> = self.sessions.write().await.drain().collect();
        for (id, server) in &drained {
            server.lock().await.close();
            debug!(session_id = %id, "Session closed on shutdown");
        }
        drained.len()
    }
}

/// State shared by every HTTP handler.
pub struct HttpState {
    sessions: SessionRegistry,
    flights: Arc<FlightService>,
    info: ServerInfo,
    cors_origin: HeaderValue,
    started: Instant,
}

impl HttpState {
    /// Creates the state for one HTTP server.
    #[must_use]
    pub fn new(info: ServerInfo, flights: Arc<FlightService>, cors_origin: &str) -> Self {
        let cors_origin = HeaderValue::from_str(cors_origin).unwrap_or_else(|_| {
            warn!(origin = cors_origin, "Invalid CORS origin, allowing any origin");
            HeaderValue::from_static("*")
        });
        Self {
            sessions: SessionRegistry::new(),
            flights,
            info,
            cors_origin,
            started: Instant::now(),
        }
    }

    /// The session registry.
    #[must_use]
    pub const fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }
}

/// Builds the HTTP router.
pub fn router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route(
            MCP_PATH,
            get(handle_get).post(handle_post).delete(handle_delete),
        )
        .route("/health", get(handle_health))
        .route("/", get(handle_root))
        .layer(middleware::from_fn_with_state(Arc::clone(&state), cors))
        .with_state(state)
}

/// Binds the configured port and serves until a shutdown signal.
///
/// # Errors
///
/// Returns an error if the port cannot be bound or serving fails.
pub async fn run(config: &Config, flights: Arc<FlightService>) -> std::io::Result<()> {
    let state = Arc::new(HttpState::new(
        ServerInfo::from(config),
        flights,
        &config.server.cors_origin,
    ));
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, path = MCP_PATH, "HTTP transport listening");
    serve(listener, state).await
}

/// Serves on `listener` until a shutdown signal, then closes all sessions.
///
/// # Errors
///
/// Returns an error if serving fails.
pub async fn serve(listener: TcpListener, state: Arc<HttpState>) -> std::io::Result<()> {
    axum::serve(listener, router(Arc::clone(&state)))
        .with_graceful_shutdown(crate::mcp::shutdown_signal())
        .await?;

    let closed = state.sessions.close_all().await;
    info!(closed, "HTTP transport stopped");
    Ok(())
}

fn session_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
}

fn rpc_error(status: StatusCode, error: &JsonRpcError) -> Response {
    (status, Json(error.to_value())).into_response()
}

fn no_valid_session(id: Option<RequestId>) -> Response {
    rpc_error(StatusCode::BAD_REQUEST, &JsonRpcError::no_valid_session(id))
}

async fn handle_post(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let msg = match serde_json::from_slice::<Value>(&body) {
        Ok(value) => match parse_value(value) {
            Ok(msg) => msg,
            Err(error) => return rpc_error(StatusCode::BAD_REQUEST, &error),
        },
        Err(_) => return rpc_error(StatusCode::BAD_REQUEST, &JsonRpcError::parse_error()),
    };

    match session_id(&headers) {
        Some(id) => {
            let Some(server) = state.sessions.get(id).await else {
                debug!(session_id = id, "Unknown session");
                return no_valid_session(msg.id().cloned());
            };
            let reply = server.lock().await.handle_message(msg).await;
            match reply {
                Some(reply) => Json(reply).into_response(),
                None => StatusCode::ACCEPTED.into_response(),
            }
        }
        None if msg.is_initialize() => initialize_session(&state, msg).await,
        None => {
            debug!(method = msg.method(), "Message without session");
            no_valid_session(msg.id().cloned())
        }
    }
}

async fn initialize_session(
    state: &HttpState,
    msg: IncomingMessage,
) -> Response {
    let mut server = McpServer::new(state.info.clone(), Arc::clone(&state.flights));
    let reply = server.handle_message(msg).await.unwrap_or(Value::Null);

    // a rejected initialize leaves no session behind
    if server.state() == ServerState::AwaitingInit {
        return Json(reply).into_response();
    }

    let id = state.sessions.create(server).await;
    let mut response = Json(reply).into_response();
    if let Ok(value) = HeaderValue::from_str(&id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(SESSION_HEADER), value);
    }
    response
}

async fn handle_get(State(state): State<Arc<HttpState>>, headers: HeaderMap) -> Response {
    match session_id(&headers) {
        Some(id) if state.sessions.get(id).await.is_some() => (
            StatusCode::METHOD_NOT_ALLOWED,
            [(axum::http::header::ALLOW, "POST, DELETE")],
            Json(
                JsonRpcError::new(
                    None,
                    SESSION_ERROR_CODE,
                    "Method not allowed: server-initiated streams are not supported",
                )
                .to_value(),
            ),
        )
            .into_response(),
        _ => no_valid_session(None),
    }
}

async fn handle_delete(State(state): State<Arc<HttpState>>, headers: HeaderMap) -> Response {
    match session_id(&headers) {
        Some(id) if state.sessions.remove(id).await => StatusCode::OK.into_response(),
        _ => no_valid_session(None),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    timestamp: String,
    uptime_seconds: u64,
    version: String,
    active_sessions: usize,
}

async fn handle_health(State(state): State<Arc<HttpState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime_seconds: state.started.elapsed().as_secs(),
        version: state.info.version.clone(),
        active_sessions: state.sessions.len().await,
    })
}

async fn handle_root(State(state): State<Arc<HttpState>>) -> Json<Value> {
    let prompts: Vec<&str> = prompt_definitions().iter().map(|p| p.name).collect();
    Json(json!({
        "name": state.info.name,
        "version": state.info.version,
        "description": "MCP server for flight search, airport lookup and airline information",
        "transport": "streamable-http",
        "endpoints": {
            "mcp": MCP_PATH,
            "health": "/health"
        },
        "tools": TOOL_NAMES,
        "prompts": prompts
    }))
}

/// Adds CORS headers to every response and answers preflight requests.
async fn cors(State(state): State<Arc<HttpState>>, request: Request, next: Next) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, state.cors_origin.clone());
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, DELETE, OPTIONS"),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Mcp-Session-Id, Accept"),
    );
    headers.insert(
        ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static("Mcp-Session-Id"),
    );
    headers.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("86400"));
    response
}
