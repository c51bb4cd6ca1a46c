use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

/// Liveness of each backend.
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    #[schema(value_type = String, example = "ok")]
    pub status: &'static str,
    /// `ok`, `memory` or `unavailable`.
    #[schema(value_type = String, example = "ok")]
    pub store: &'static str,
    /// `ok`, `disabled` or `unavailable`.
    #[schema(value_type = String, example = "disabled")]
    pub cache: &'static str,
}

/// Reports whether the store and the cache are reachable.
#[utoipa::path(
    get,
    path = "/health",
    tag = "ops",
    responses(
        (status = 200, description = "Every backend is reachable", body = HealthResponse),
        (status = 503, description = "A backend is unreachable", body = HealthResponse)
    )
)]
#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> Response {
    let store = match &state.db {
        Some(pool) => match crate::db::ping(pool).await {
            Ok(()) => "ok",
            Err(e) => {
                tracing::error!("❌ Database health check failed: {}", e);
                "unavailable"
            }
        },
        None => "memory",
    };

    let cache = match &state.cache {
        Some(cache) => match cache.ping().await {
            Ok(()) => "ok",
            Err(e) => {
                tracing::error!("❌ Redis health check failed: {}", e);
                "unavailable"
            }
        },
        None => "disabled",
    };

    let healthy = store != "unavailable" && cache != "unavailable";
    let (status_code, status) = if healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (status_code, Json(HealthResponse { status, store, cache })).into_response()
}
