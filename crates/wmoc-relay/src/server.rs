//! # Relay HTTP Server
//!
//! The HTTP surface agents poll and the dashboard drives.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Relay Server (Axum)                              │
//! │                                                                         │
//! │  Agents                                                                 │
//! │  ──────                                                                 │
//! │  POST /sync?wmoc_assigned_id=..  ──▶ SyncEndpoint::handle_raw           │
//! │                                                                         │
//! │  Dashboard                                                              │
//! │  ─────────                                                              │
//! │  GET  /miner_log?miner_id=..     ──▶ OperatorApi::read_log              │
//! │  POST /send_miner_command        ──▶ OperatorApi::enqueue_command       │
//! │  POST /clear_miner_log           ──▶ OperatorApi::clear_device          │
//! │                                                                         │
//! │  GET  /health                    ──▶ "OK"                               │
//! │                                                                         │
//! │  Errors                                                                 │
//! │  ──────                                                                 │
//! │  InvalidRequest      → 400 {"status":"error","message":..}              │
//! │  StorageUnavailable  → 500 {"status":"error","message":..}              │
//! │  Body over limit     → 413 {"status":"error","message":..}              │
//! │  Bad query string    → 400 {"status":"error","message":..}              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        DefaultBodyLimit, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use wmoc_core::protocol::{MinerQuery, SendCommandRequest};
use wmoc_core::{
    ClearResponse, CoreError, ErrorResponse, LogEntry, SendCommandResponse, SyncResponse,
};

use crate::config::ServerSettings;
use crate::endpoint::SyncEndpoint;
use crate::error::{RelayError, RelayResult};
use crate::relay::Relay;
use crate::service::OperatorApi;

// =============================================================================
// Router
// =============================================================================

#[derive(Clone)]
struct AppState {
    endpoint: SyncEndpoint,
    operator: Arc<dyn OperatorApi>,
}

/// Builds the relay's routes.
pub fn router(endpoint: SyncEndpoint, operator: Arc<dyn OperatorApi>, max_body_bytes: usize) -> Router {
    let state = AppState { endpoint, operator };

    Router::new()
        .route("/sync", post(sync_handler))
        .route("/miner_log", get(miner_log_handler))
        .route("/send_miner_command", post(send_command_handler))
        .route("/clear_miner_log", post(clear_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

/// Router over a [`Relay`], which serves both the agent and operator sides.
pub fn relay_router(relay: Arc<Relay>, max_body_bytes: usize) -> Router {
    let endpoint = relay.endpoint().clone();
    router(endpoint, relay, max_body_bytes)
}

// =============================================================================
// Relay Server
// =============================================================================

/// The HTTP server.
pub struct RelayServer {
    settings: ServerSettings,
    relay: Arc<Relay>,
}

/// Handle for a running server.
pub struct RelayHandle {
    local_addr: SocketAddr,
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl RelayHandle {
    /// Address the listener is actually bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops accepting connections, drains in-flight requests, and waits
    /// for the server task to finish.
    pub async fn shutdown(self) -> RelayResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| RelayError::ChannelError("Relay shutdown channel closed".into()))?;

        self.task
            .await
            .map_err(|e| RelayError::ChannelError(format!("Relay server task failed: {}", e)))
    }
}

impl RelayServer {
    pub fn new(settings: ServerSettings, relay: Arc<Relay>) -> Self {
        RelayServer { settings, relay }
    }

    /// Binds the listener, starts serving, and returns a handle.
    pub async fn start(self) -> RelayResult<RelayHandle> {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let app = relay_router(self.relay, self.settings.max_body_bytes);

        let bind_addr = self.settings.bind_address();
        let bind_failed = |e: std::io::Error| RelayError::BindFailed {
            addr: bind_addr.clone(),
            reason: e.to_string(),
        };
        let listener = TcpListener::bind(&bind_addr).await.map_err(bind_failed)?;
        let local_addr = listener.local_addr().map_err(bind_failed)?;

        info!(addr = %local_addr, "Relay server started");

        let task = tokio::spawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_rx.recv().await;
                    info!("Relay server shutting down");
                })
                .await;

            if let Err(e) = result {
                error!(?e, "Relay server stopped with error");
            }
        });

        Ok(RelayHandle {
            local_addr,
            shutdown_tx,
            task,
        })
    }
}

// =============================================================================
// Handlers
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct SyncQuery {
    wmoc_assigned_id: Option<String>,
}

/// Health check endpoint.
async fn health_handler() -> impl IntoResponse {
    "OK"
}

/// Agent report.
async fn sync_handler(
    State(state): State<AppState>,
    query: Result<Query<SyncQuery>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<SyncResponse>, ApiError> {
    let Query(query) = query?;
    let body = body?;
    let response = state
        .endpoint
        .handle_raw(&body, query.wmoc_assigned_id.as_deref())
        .await?;
    Ok(Json(response))
}

async fn miner_log_handler(
    State(state): State<AppState>,
    query: Result<Query<MinerQuery>, QueryRejection>,
) -> Result<Json<Vec<LogEntry>>, ApiError> {
    let Query(query) = query?;
    let entries = state.operator.read_log(&query.miner_id).await?;
    Ok(Json(entries))
}

async fn send_command_handler(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<SendCommandResponse>, ApiError> {
    let body = body?;
    let request: SendCommandRequest = parse_json_body(&body)?;
    let (device, details) = request.into_command().map_err(RelayError::from)?;

    let command_id = state.operator.enqueue_command(&device, details).await?;
    Ok(Json(SendCommandResponse::queued(command_id)))
}

async fn clear_handler(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<ClearResponse>, ApiError> {
    let body = body?;
    let MinerQuery { miner_id } = parse_json_body(&body)?;
    state.operator.clear_device(&miner_id).await?;
    Ok(Json(ClearResponse::cleared(&miner_id)))
}

/// Parses a JSON request body. An empty body reads as `{}`.
fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> RelayResult<T> {
    let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
        b"{}"
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|e| CoreError::InvalidJson(e.to_string()).into())
}

// =============================================================================
// Error Response
// =============================================================================

/// A failed request rendered as an HTTP response.
#[derive(Debug)]
pub enum ApiError {
    /// Error raised by the relay itself.
    Relay(RelayError),

    /// Request refused by an extractor before reaching the relay
    /// (oversized body, malformed query string).
    Rejected { status: StatusCode, message: String },
}

impl From<RelayError> for ApiError {
    fn from(err: RelayError) -> Self {
        ApiError::Relay(err)
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Relay(err) if err.is_client_error() => {
                debug!(error = %err, "Rejected request");
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            ApiError::Relay(err) => {
                error!(error = %err, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            ApiError::Rejected { status, message } => {
                debug!(%status, error = %message, "Rejected request");
                (status, message)
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wmoc_store::MemoryStore;

    #[test]
    fn test_parse_json_body() {
        let query: MinerQuery = parse_json_body(b"").unwrap();
        assert!(query.miner_id.is_unknown());

        let query: MinerQuery = parse_json_body(br#"{"miner_id":"rig-7"}"#).unwrap();
        assert_eq!(query.miner_id.as_str(), "rig-7");

        let err = parse_json_body::<MinerQuery>(b"{").unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_error_status_codes() {
        let response = ApiError::from(RelayError::InvalidRequest("nope".into())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response =
            ApiError::from(RelayError::StorageUnavailable("down".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = ApiError::Rejected {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message: "too big".into(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_start_and_shutdown() {
        let relay = Arc::new(Relay::new(
            Arc::new(MemoryStore::new()),
            Duration::from_secs(3600),
        ));
        let settings = ServerSettings {
            bind_addr: "127.0.0.1".to_string(),
            port: 0,
            ..ServerSettings::default()
        };

        let handle = RelayServer::new(settings, relay).start().await.unwrap();
        assert_ne!(handle.local_addr().port(), 0);

        tokio::net::TcpStream::connect(handle.local_addr()).await.unwrap();
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_bind_conflict_is_reported() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let settings = ServerSettings {
            bind_addr: "127.0.0.1".to_string(),
            port: taken.local_addr().unwrap().port(),
            ..ServerSettings::default()
        };
        let relay = Arc::new(Relay::new(
            Arc::new(MemoryStore::new()),
            Duration::from_secs(3600),
        ));

        let err = RelayServer::new(settings, relay).start().await.err().unwrap();
        assert!(matches!(err, RelayError::BindFailed { .. }));
    }
}
