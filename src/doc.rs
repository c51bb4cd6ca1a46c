//! OpenAPI documentation.
//!
//! [`ApiDoc`] is served as YAML on `/swagger.yaml` and rendered by Swagger UI
//! on `/docs`.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::{
    error::ErrorBody,
    handlers::{
        auth::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
        health::HealthResponse,
        messages::{SendMessageRequest, SendMessageResponse},
    },
    services::conversations::MessageView,
};

/// Path the generated document is served on as JSON for Swagger UI.
pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

/// Registers the bearer token scheme referenced by the protected routes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer_token",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

/// OpenAPI document for the HTTP API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Chat system API",
        description = "Registration, bearer-token sessions and direct messages."
    ),
    paths(
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::messages::send_message,
        crate::handlers::messages::message_history,
        crate::handlers::messages::conversation_with,
        crate::handlers::health::health,
        crate::handlers::metrics::metrics,
    ),
    components(schemas(
        RegisterRequest,
        RegisterResponse,
        LoginRequest,
        LoginResponse,
        SendMessageRequest,
        SendMessageResponse,
        MessageView,
        HealthResponse,
        ErrorBody,
    )),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "messages", description = "Sending and reading direct messages"),
        (name = "ops", description = "Health and metrics")
    )
)]
pub struct ApiDoc;
