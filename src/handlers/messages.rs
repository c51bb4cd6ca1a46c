use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, ErrorBody, Result},
    middleware_layer::auth::AuthenticatedUser,
    services::conversations::{ConversationAssembler, MessageView},
    state::AppState,
    validation::{message::*, request::json_body},
};

/// The request payload for sending a message.
#[derive(Deserialize, ToSchema)]
pub struct SendMessageRequest {
    /// The recipient's username.
    pub recipient: String,
    pub content: String,
}

/// The response payload for a sent message.
#[derive(Serialize, ToSchema)]
pub struct SendMessageResponse {
    pub message: String,
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
}

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Result<Response> {
    let body = sonic_rs::to_string(value)
        .map_err(|e| AppError::Internal(format!("Response serialization failed: {}", e)))?;
    Ok((status, [(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// Resolves a username given by the client, reporting an unknown one as 404.
async fn resolve_user(state: &AppState, username: &str, role: &str) -> Result<Uuid> {
    match state.identity.resolve_id(username).await {
        Err(AppError::NotFound(_)) => Err(AppError::NotFound(format!("{} '{}'", role, username))),
        other => other,
    }
}

/// Sends a direct message from the authenticated user.
#[utoipa::path(
    post,
    path = "/send",
    tag = "messages",
    security(("bearer_token" = [])),
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message stored", body = SendMessageResponse),
        (status = 400, description = "Malformed body or empty content", body = ErrorBody),
        (status = 401, description = "Missing or unknown token", body = ErrorBody),
        (status = 404, description = "Recipient does not exist", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn send_message(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: std::result::Result<Json<SendMessageRequest>, JsonRejection>,
) -> Result<Response> {
    let payload = json_body(payload)?;
    validate_recipient(&payload.recipient)?;
    validate_content(&payload.content)?;

    let recipient_id = resolve_user(&state, &payload.recipient, "Recipient").await?;

    let message = state
        .messages
        .save(user.user_id, recipient_id, &payload.content)
        .await?;

    tracing::info!("✅ Message {} sent by user: {}", message.id, user.user_id);

    let response = SendMessageResponse {
        message: "Message sent".to_string(),
        id: message.id,
        timestamp: message.timestamp,
    };

    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// Returns the authenticated user's full history grouped by correspondent.
#[utoipa::path(
    get,
    path = "/messages",
    tag = "messages",
    security(("bearer_token" = [])),
    responses(
        (
            status = 200,
            description = "Correspondent username to messages, oldest first",
            body = std::collections::BTreeMap<String, Vec<MessageView>>
        ),
        (status = 401, description = "Missing or unknown token", body = ErrorBody),
        (status = 500, description = "Storage or name resolution failure", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn message_history(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Response> {
    let messages = state.messages.messages_for_user(user.user_id).await?;
    tracing::debug!("📨 {} message(s) for user: {}", messages.len(), user.user_id);

    let conversations =
        ConversationAssembler::new(&state.identity, state.config.unresolved_name_policy)
            .assemble(user.user_id, messages)
            .await?;

    json_response(StatusCode::OK, &conversations)
}

/// Returns the thread between the authenticated user and `username`.
#[utoipa::path(
    get,
    path = "/messages/{username}",
    tag = "messages",
    security(("bearer_token" = [])),
    params(("username" = String, Path, description = "The other participant")),
    responses(
        (status = 200, description = "The thread, oldest first", body = Vec<MessageView>),
        (status = 401, description = "Missing or unknown token", body = ErrorBody),
        (status = 404, description = "User does not exist", body = ErrorBody),
        (status = 500, description = "Storage or name resolution failure", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn conversation_with(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(username): Path<String>,
) -> Result<Response> {
    let other_id = resolve_user(&state, &username, "User").await?;

    let messages = state.messages.messages_between(user.user_id, other_id).await?;

    let thread = ConversationAssembler::new(&state.identity, state.config.unresolved_name_policy)
        .thread(messages)
        .await?;

    json_response(StatusCode::OK, &thread)
}
