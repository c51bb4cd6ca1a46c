use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::{error::Result, state::AppState};

/// Exposes request counters in the Prometheus text format.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "ops",
    responses(
        (
            status = 200,
            description = "Prometheus text exposition",
            body = String,
            content_type = "text/plain"
        ),
        (
            status = 500,
            description = "Metrics could not be encoded",
            body = crate::error::ErrorBody
        )
    )
)]
#[axum::debug_handler]
pub async fn metrics(State(state): State<AppState>) -> Result<Response> {
    let body = state.metrics.render()?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}
