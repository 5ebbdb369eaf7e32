//! HTTP server exposing search aggregation and feedback intake.
//!
//! ## Endpoints
//!
//! - `GET /search/{query}`: aggregated results from every source
//! - `POST /api/feedback`: authenticated feedback submission
//! - `GET /api/auth/login`: current session's user id
//! - `DELETE /api/auth/logout`: expire the session cookie
//! - `GET /health`: liveness probe

use crate::auth::{handle_check_login, handle_logout};
use crate::config::{AppConfig, ServerConfig};
use crate::error::{Result, ServerError};
use crate::feedback::{FeedbackSink, LogFeedbackSink, handle_feedback};
use crate::session::{SessionContext, SignedSessionService};
use axum::Router;
use axum::extract::rejection::PathRejection;
use axum::extract::{FromRef, Path, State};
use axum::http::{HeaderValue, Method, header};
use axum::response::Json;
use axum::routing::{delete, get, post};
use mdr_search::{AggregatedResponse, Aggregator, SearchError};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Search aggregator with its pooled HTTP client.
    pub aggregator: Arc<Aggregator>,
    /// Session validation for authenticated routes.
    pub sessions: SessionContext,
    /// Destination for accepted feedback.
    pub feedback: Arc<dyn FeedbackSink>,
}

impl AppState {
    /// Build the aggregator, session service and feedback sink described by
    /// `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Config`] if `config` fails
    /// [`AppConfig::validate`], including a blank session secret.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;
        let aggregator = Aggregator::new(&config.search.to_search_config()).map_err(|e| {
            ServerError::Config(format!("failed to build search aggregator: {e}"))
        })?;
        let service = SignedSessionService::from_config(&config.session);
        Ok(Self {
            aggregator: Arc::new(aggregator),
            sessions: SessionContext::new(Arc::new(service), config.session.cookie_name.as_str()),
            feedback: Arc::new(LogFeedbackSink::new(config.feedback.recipient.clone())),
        })
    }
}

impl FromRef<AppState> for SessionContext {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl FromRef<AppState> for Arc<dyn FeedbackSink> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.feedback)
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: String,
}

/// Build the application router with CORS and request tracing.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/search/{query}", get(handle_search))
        .route("/search/", get(handle_empty_search))
        .route("/search", get(handle_empty_search))
        .route("/api/feedback", post(handle_feedback))
        .route("/api/auth/login", get(handle_check_login))
        .route("/api/auth/logout", delete(handle_logout))
        .route("/health", get(handle_health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config))
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) if value != "*" => Some(value),
            _ => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

async fn handle_search(
    State(state): State<AppState>,
    path: std::result::Result<Path<String>, PathRejection>,
) -> Result<Json<AggregatedResponse>> {
    let Path(query) = path.map_err(|e| ServerError::BadRequest(e.body_text()))?;
    tracing::trace!(query = %query, "search request");
    let response = state.aggregator.aggregate(&query).await?;
    Ok(Json(response))
}

async fn handle_empty_search() -> ServerError {
    ServerError::Search(SearchError::EmptyQuery)
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_owned(),
    })
}

/// A running HTTP server.
pub struct SearchServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl SearchServer {
    /// Start the server.
    ///
    /// Binds to `{config.host}:{config.port}` (use port `0` for auto-assign)
    /// and begins serving in a background tokio task.
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP listener cannot bind.
    pub async fn start(state: AppState, config: &ServerConfig) -> Result<Self> {
        let app = router(state, config);

        let bind_addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&bind_addr).await?;
        let addr = listener.local_addr()?;

        info!("search server listening on http://{addr}");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("search server error: {e}");
            }
        });

        Ok(Self { addr, handle })
    }

    /// Returns the address the server is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Abort the server task.
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for SearchServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
