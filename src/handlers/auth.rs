use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::{AppError, ErrorBody, Result},
    state::AppState,
    validation::{auth::*, request::json_body},
};

/// The request payload for user registration.
#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

/// The request payload for user login.
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// The response payload for registration.
#[derive(Serialize, ToSchema)]
pub struct RegisterResponse {
    pub message: String,
}

/// The response payload for a successful login.
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
}

/// Handles user registration.
#[utoipa::path(
    post,
    path = "/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = RegisterResponse),
        (status = 400, description = "Malformed body or invalid credentials", body = ErrorBody),
        (status = 409, description = "Username already exists", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    payload: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Response> {
    let payload = json_body(payload)?;
    tracing::info!("📝 Register attempt: {}", payload.username);

    validate_username(&payload.username)?;
    validate_password(&payload.password)?;

    let user_id = state
        .identity
        .create(&payload.username, &payload.password)
        .await?;

    tracing::info!("✅ User registered: {}", user_id);

    let response = RegisterResponse {
        message: "Registration successful".to_string(),
    };

    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// Handles user login.
///
/// Unknown usernames and wrong passwords are both reported as 401 with the
/// same message; storage failures are reported as 500.
#[utoipa::path(
    post,
    path = "/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = LoginResponse),
        (status = 400, description = "Malformed body", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 500, description = "Storage failure", body = ErrorBody)
    )
)]
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    payload: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response> {
    let payload = json_body(payload)?;
    tracing::info!("🔐 Login attempt: {}", payload.username);

    let user_id = match state
        .identity
        .authenticate(&payload.username, &payload.password)
        .await
    {
        Ok((user_id, true)) => user_id,
        Ok((_, false)) | Err(AppError::NotFound(_)) => {
            return Err(AppError::Authentication("Invalid credentials".to_string()));
        }
        Err(e) => return Err(e),
    };

    let token = state.sessions.create(user_id).await?;

    tracing::info!("✅ User logged in: {}", user_id);

    let response = LoginResponse {
        message: "Login successful".to_string(),
        token,
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}
