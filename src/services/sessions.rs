use std::sync::Arc;

use uuid::Uuid;

use crate::{
    crypto::token::{generate_session_token, strip_bearer},
    error::{AppError, Result},
    models::session::Session,
    repositories::session::SessionRepository,
};

/// Issues and validates bearer tokens. Tokens do not expire.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<dyn SessionRepository>,
}

impl SessionStore {
    pub fn new(sessions: Arc<dyn SessionRepository>) -> Self {
        Self { sessions }
    }

    /// Issues a new token for the user.
    pub async fn create(&self, user_id: Uuid) -> Result<String> {
        let session = Session::new(generate_session_token(), user_id);
        self.sessions.insert(&session).await?;
        tracing::info!("✅ Session {} issued for user: {}", session.id, user_id);
        Ok(session.token)
    }

    /// Resolves a presented token to its user id.
    ///
    /// Accepts the raw `Authorization` header value; a leading `Bearer ` is
    /// stripped. Returns `NotFound` when no session matches.
    pub async fn validate(&self, raw_token: &str) -> Result<Uuid> {
        let token = strip_bearer(raw_token);
        if token.is_empty() {
            return Err(AppError::NotFound("Session".to_string()));
        }

        let session = self
            .sessions
            .find_by_token(token)
            .await?
            .ok_or_else(|| AppError::NotFound("Session".to_string()))?;

        Ok(session.user_id)
    }
}
