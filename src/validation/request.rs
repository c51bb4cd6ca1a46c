use axum::{Json, extract::rejection::JsonRejection};

use crate::error::{AppError, Result};

/// Unwraps a JSON body, turning any rejection (bad syntax, wrong shape,
/// missing content type) into a 400 validation error.
pub fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        AppError::Validation(format!(
            "Invalid request payload: {}",
            rejection.body_text()
        ))
    })
}
