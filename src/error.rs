use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A database error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// A connection could not be checked out of the pool.
    #[error("Database pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// The pool could not be built.
    #[error("Database pool creation error: {0}")]
    CreatePool(#[from] deadpool_postgres::CreatePoolError),

    /// A Redis error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A metric could not be registered or encoded.
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// A storage backend failure that has no driver error attached.
    #[error("Storage error: {0}")]
    Storage(String),

    /// An entity that was looked up does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Registration with a username that is already taken.
    #[error("Username already exists: {0}")]
    DuplicateUser(String),

    /// A user id referenced by a message could not be resolved to a name.
    #[error("Could not resolve user {0}")]
    Resolution(Uuid),

    /// An authentication error.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The request carries no valid identity.
    #[error("Unauthorized")]
    Unauthorized,

    /// A validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// The JSON body of every error response.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable description of what went wrong.
    pub error: String,
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Whether the error means the storage layer itself failed.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            AppError::Database(_)
                | AppError::Pool(_)
                | AppError::CreatePool(_)
                | AppError::Redis(_)
                | AppError::Storage(_)
        )
    }

    /// The HTTP status this error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateUser(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Authentication(_) | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                "Database error".to_string()
            }

            AppError::Pool(ref e) => {
                tracing::error!("Database pool error: {}", e);
                "Database error".to_string()
            }

            AppError::CreatePool(ref e) => {
                tracing::error!("Database pool creation error: {}", e);
                "Database error".to_string()
            }

            AppError::Redis(ref e) => {
                tracing::error!("Redis error: {}", e);
                "Cache error".to_string()
            }

            AppError::Metrics(ref e) => {
                tracing::error!("Metrics error: {}", e);
                "Internal server error".to_string()
            }

            AppError::Storage(ref msg) => {
                tracing::error!("Storage error: {}", msg);
                "Storage error".to_string()
            }

            AppError::NotFound(ref what) => {
                tracing::debug!("Not found: {}", what);
                format!("{} not found", what)
            }

            AppError::DuplicateUser(ref username) => {
                tracing::warn!("Duplicate registration for: {}", username);
                "Username already exists".to_string()
            }

            AppError::Resolution(ref user_id) => {
                tracing::error!("Unresolvable user id in message history: {}", user_id);
                "Could not resolve message participants".to_string()
            }

            AppError::Authentication(ref msg) => {
                tracing::warn!("Authentication failed: {}", msg);
                msg.clone()
            }

            AppError::Unauthorized => {
                tracing::warn!("Request without a valid session");
                "Unauthorized".to_string()
            }

            AppError::Validation(ref msg) => {
                tracing::debug!("Validation error: {}", msg);
                msg.clone()
            }

            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
        };

        let body = sonic_rs::to_string(&ErrorBody { error: message })
            .unwrap_or_else(|_| r#"{"error":"Internal server error"}"#.to_string());

        (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
    }
}
