use std::sync::Arc;

use async_trait::async_trait;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::user::User,
    repositories::user::UserRepository,
    services::conversations::NameResolver,
};

/// Registers users and maps between ids and usernames.
///
/// Passwords are stored and compared as plain text. Hashing is a known gap,
/// see DESIGN.md.
#[derive(Clone)]
pub struct IdentityStore {
    users: Arc<dyn UserRepository>,
}

impl IdentityStore {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Creates a new user.
    ///
    /// # Returns
    ///
    /// The new user's id, `DuplicateUser` if the username is taken, or a
    /// storage error.
    pub async fn create(&self, username: &str, password: &str) -> Result<Uuid> {
        tracing::debug!("🔐 Creating user: {}", username);
        let user = User::new(username.to_string(), password.to_string());
        self.users.insert(&user).await?;
        tracing::info!("✅ User created with ID: {}", user.id);
        Ok(user.id)
    }

    /// Checks a username/password pair.
    ///
    /// # Returns
    ///
    /// `(user_id, true)` on a match, `(user_id, false)` on a wrong password,
    /// `NotFound` when no such username exists.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<(Uuid, bool)> {
        tracing::debug!("🔐 Authenticating user: {}", username);
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User '{}'", username)))?;

        let matches: bool = password.as_bytes().ct_eq(user.password.as_bytes()).into();
        Ok((user.id, matches))
    }

    /// Looks up the username for an id.
    pub async fn resolve_username(&self, user_id: Uuid) -> Result<String> {
        self.users
            .find_by_id(user_id)
            .await?
            .map(|user| user.username)
            .ok_or_else(|| AppError::NotFound(format!("User {}", user_id)))
    }

    /// Looks up the id for a username.
    pub async fn resolve_id(&self, username: &str) -> Result<Uuid> {
        self.users
            .find_by_username(username)
            .await?
            .map(|user| user.id)
            .ok_or_else(|| AppError::NotFound(format!("User '{}'", username)))
    }
}

#[async_trait]
impl NameResolver for IdentityStore {
    async fn resolve_username(&self, user_id: Uuid) -> Result<String> {
        IdentityStore::resolve_username(self, user_id).await
    }
}
