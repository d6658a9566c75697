// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use riley_agent::Orchestrator;
use riley_core::RileyError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{auth_middleware, AuthConfig};
use crate::{handlers, sms};

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub orchestrator: Arc<Orchestrator>,
    pub auth: AuthConfig,
    /// Process start, for the uptime in `/health`.
    pub start_time: Instant,
    /// Upper bound on producing one reply.
    pub request_timeout: Duration,
}

impl GatewayState {
    pub fn new(orchestrator: Arc<Orchestrator>, config: &ServerConfig) -> Self {
        Self {
            orchestrator,
            auth: AuthConfig {
                bearer_token: config.bearer_token.clone(),
            },
            start_time: Instant::now(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

/// Gateway server configuration (mirrors the `[gateway]` config section).
#[derive(Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Bearer token for the conversation API (None = open).
    pub bearer_token: Option<String>,
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("bearer_token", &self.bearer_token.as_ref().map(|_| "[redacted]"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// All gateway routes:
/// - GET /health (public)
/// - POST /v1/message (public)
/// - POST /sms/webhook (public, TwiML)
/// - /v1/conversations* (bearer auth when configured)
pub fn router(state: GatewayState) -> Router {
    let auth_state = state.auth.clone();

    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .route("/v1/message", post(handlers::post_message))
        .route("/sms/webhook", post(sms::post_webhook))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route("/v1/conversations", get(handlers::list_conversations))
        .route("/v1/conversations/{id}", get(handlers::get_conversation))
        .route(
            "/v1/conversations/{id}/status",
            post(handlers::post_status),
        )
        .route(
            "/v1/conversations/{id}/messages",
            post(handlers::post_operator_message),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind and serve until `shutdown` resolves.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), RileyError> {
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| RileyError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!(%addr, "gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| RileyError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })
}
