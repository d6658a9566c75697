// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON handlers: chat messages, the conversation API, and health.

use std::str::FromStr;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use riley_agent::{InboundReply, InboundRequest};
use riley_core::{
    Channel, Conversation, ConversationFilter, ConversationId, ConversationStats,
    ConversationStatus, Metadata, RileyError, Role,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::server::GatewayState;

/// Largest page the list endpoint returns.
const MAX_LIST_LIMIT: usize = 500;

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

/// Maps [`RileyError`] onto HTTP. Storage and internal details stay in the log.
pub struct ApiError(pub RileyError);

impl From<RileyError> for ApiError {
    fn from(err: RileyError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self.0 {
            err @ RileyError::Validation { .. } => {
                error_response(StatusCode::BAD_REQUEST, err.to_string())
            }
            RileyError::NotFound { .. } => {
                error_response(StatusCode::NOT_FOUND, "conversation not found")
            }
            RileyError::Timeout { .. } => {
                error_response(StatusCode::SERVICE_UNAVAILABLE, "request timed out")
            }
            err => {
                error!(error = %err, "request failed");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

/// Request body for POST /v1/message.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub participant_id: Option<String>,
    /// Defaults to `web`.
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

/// Response body for POST /v1/message.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub conversation_id: ConversationId,
    pub reply_text: String,
    pub timestamp: DateTime<Utc>,
}

fn required(value: Option<String>, field: &str) -> Result<String, RileyError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| RileyError::validation(field))
}

/// Run the pipeline on its own task so a message that outlives the request
/// budget still records its reply.
pub(crate) async fn run_inbound(
    state: &GatewayState,
    request: InboundRequest,
) -> Result<InboundReply, RileyError> {
    let orchestrator = state.orchestrator.clone();
    let task = tokio::spawn(async move { orchestrator.handle_inbound(request).await });
    match tokio::time::timeout(state.request_timeout, task).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(join)) => Err(RileyError::Internal(format!("message task failed: {join}"))),
        Err(_) => Err(RileyError::Timeout {
            duration: state.request_timeout,
        }),
    }
}

/// POST /v1/message
pub async fn post_message(
    State(state): State<GatewayState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let text = required(body.text, "text")?;
    let participant_id = required(body.participant_id, "participantId")?;
    let channel = match body.channel.as_deref() {
        None => Channel::Web,
        Some(raw) => Channel::from_str(raw).map_err(|_| RileyError::validation("channel"))?,
    };

    let request = InboundRequest {
        participant_id,
        channel,
        text,
        conversation_id: body.conversation_id.map(ConversationId::from),
        metadata: Metadata::new(),
    };
    let reply = run_inbound(&state, request).await?;

    Ok(Json(ChatResponse {
        conversation_id: reply.conversation_id,
        reply_text: reply.reply_text,
        timestamp: reply.timestamp,
    }))
}

/// Query parameters for GET /v1/conversations.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(default)]
    pub status: Option<ConversationStatus>,
    #[serde(default)]
    pub participant_id: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Response body for GET /v1/conversations.
#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationListResponse {
    pub conversations: Vec<Conversation>,
    pub stats: ConversationStats,
    pub timestamp: DateTime<Utc>,
}

/// GET /v1/conversations
pub async fn list_conversations(
    State(state): State<GatewayState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ConversationListResponse>, ApiError> {
    let defaults = ConversationFilter::default();
    let filter = ConversationFilter {
        status: params.status,
        participant_id: params.participant_id,
        limit: params.limit.unwrap_or(defaults.limit).clamp(1, MAX_LIST_LIMIT),
    };
    let store = state.orchestrator.store();
    let conversations = store.list(&filter).await?;
    let stats = store.stats().await?;
    Ok(Json(ConversationListResponse {
        conversations,
        stats,
        timestamp: Utc::now(),
    }))
}

/// GET /v1/conversations/{id}
pub async fn get_conversation(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<Conversation>, ApiError> {
    let id = ConversationId::from(id);
    state
        .orchestrator
        .store()
        .find_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| RileyError::not_found(id.as_str()).into())
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

/// POST /v1/conversations/{id}/status
pub async fn post_status(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(body): Json<StatusRequest>,
) -> Response {
    let Some(status) = body
        .status
        .as_deref()
        .and_then(|s| ConversationStatus::from_str(s).ok())
    else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "status must be one of active, pending, resolved",
        );
    };

    match state
        .orchestrator
        .update_status(&ConversationId::from(id), status)
        .await
    {
        Ok(conversation) => Json(conversation).into_response(),
        Err(e) => ApiError(e).into_response(),
    }
}

/// Request body for POST /v1/conversations/{id}/messages.
#[derive(Debug, Default, Deserialize)]
pub struct OperatorMessageRequest {
    #[serde(default)]
    pub message: Option<String>,
    /// `assistant` (default) or `user`.
    #[serde(default)]
    pub role: Option<String>,
}

/// POST /v1/conversations/{id}/messages
pub async fn post_operator_message(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
    Json(body): Json<OperatorMessageRequest>,
) -> Result<Json<Conversation>, ApiError> {
    let message = required(body.message, "message")?;
    let role = match body.role.as_deref() {
        None => Role::Assistant,
        Some(raw) => Role::from_str(raw).map_err(|_| RileyError::validation("role"))?,
    };
    let conversation = state
        .orchestrator
        .post_message(&ConversationId::from(id), &message, role)
        .await?;
    Ok(Json(conversation))
}

/// Response body for GET /health.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}
