use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    doc::{ApiDoc, OPENAPI_JSON_PATH},
    handlers, middleware_layer,
    state::AppState,
};

/// Builds the HTTP router.
///
/// `/register`, `/login`, `/health`, `/metrics` and the API docs are public;
/// everything else sits behind the bearer-token gate. Every route is counted
/// in `http_requests_total`.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/health", get(handlers::health::health))
        .route("/metrics", get(handlers::metrics::metrics))
        .route("/swagger.yaml", get(handlers::docs::swagger_yaml));

    let protected_routes = Router::new()
        .route("/send", post(handlers::messages::send_message))
        .route("/messages", get(handlers::messages::message_history))
        .route(
            "/messages/{username}",
            get(handlers::messages::conversation_with),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::auth::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(SwaggerUi::new("/docs").url(OPENAPI_JSON_PATH, ApiDoc::openapi()))
        .layer(from_fn_with_state(
            state.clone(),
            middleware_layer::metrics::track_requests,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default())
                .on_request(DefaultOnRequest::default().level(Level::DEBUG))
                .on_response(DefaultOnResponse::default().level(Level::DEBUG))
                .on_failure(DefaultOnFailure::default().level(Level::ERROR)),
        )
        .with_state(state)
}
