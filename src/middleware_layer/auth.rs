use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{Request, header, request::Parts},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

/// The identity established by [`require_auth`].
///
/// Handlers take this as an explicit argument and pass `user_id` on to the
/// stores; a request that never went through the gate is rejected with 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .ok_or(AppError::Unauthorized)
    }
}

/// Reads the `Authorization` header value, if it is present and non-blank.
fn extract_authorization(request: &Request<Body>) -> Option<String> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// A middleware that requires a valid bearer token.
///
/// # Arguments
///
/// * `state` - The application state.
/// * `request` - The incoming request.
/// * `next` - The next middleware in the chain.
///
/// # Returns
///
/// The downstream `Response`, 401 for a missing or unknown token, or 500 if
/// the session lookup itself failed.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    tracing::debug!("🔐 Checking authentication...");

    let authorization = extract_authorization(&request).ok_or_else(|| {
        tracing::warn!("❌ No Authorization header");
        AppError::Unauthorized
    })?;

    let user_id = match state.sessions.validate(&authorization).await {
        Ok(user_id) => user_id,
        Err(AppError::NotFound(_)) => {
            tracing::warn!("❌ Unknown session token");
            return Err(AppError::Unauthorized);
        }
        Err(e) => return Err(e),
    };

    tracing::debug!("✅ User authenticated: {}", user_id);

    request.extensions_mut().insert(AuthenticatedUser { user_id });

    Ok(next.run(request).await)
}
