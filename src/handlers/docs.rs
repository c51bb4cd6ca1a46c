use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use utoipa::OpenApi;

use crate::{
    doc::ApiDoc,
    error::{AppError, Result},
};

/// Serves the OpenAPI document as YAML.
pub async fn swagger_yaml() -> Result<Response> {
    let yaml = ApiDoc::openapi()
        .to_yaml()
        .map_err(|e| AppError::Internal(format!("OpenAPI serialization failed: {}", e)))?;

    Ok((StatusCode::OK, [(header::CONTENT_TYPE, "application/yaml")], yaml).into_response())
}
