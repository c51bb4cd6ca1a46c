use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

/// A bearer-token session. Sessions never expire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The unique identifier for the session row.
    pub id: Uuid,
    /// The opaque token handed to the client.
    pub token: String,
    /// The ID of the user this session belongs to.
    pub user_id: Uuid,
    /// The timestamp when the session was created.
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: String, user_id: Uuid) -> Self {
        Self {
            id: Uuid::now_v7(),
            token,
            user_id,
            created_at: Utc::now().trunc_subsecs(6),
        }
    }
}
