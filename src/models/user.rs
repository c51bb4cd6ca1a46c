use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

/// Represents a user in the system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    /// The unique identifier for the user.
    pub id: Uuid,
    /// The user's username, unique across the system.
    pub username: String,
    /// The user's password, stored as given.
    pub password: String,
    /// The timestamp when the user was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Builds a fresh user record with a time-ordered id.
    pub fn new(username: String, password: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            username,
            password,
            created_at: Utc::now().trunc_subsecs(6),
        }
    }
}
