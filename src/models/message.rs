use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

/// A directed message between two users.
///
/// Messages are immutable once stored. `sender` and `recipient` may be the
/// same user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Time-ordered, globally unique identifier.
    pub id: Uuid,
    /// The ID of the sending user.
    pub sender: Uuid,
    /// The ID of the receiving user.
    pub recipient: Uuid,
    /// The message body.
    pub content: String,
    /// When the message was stored.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Builds a new message stamped with the current time.
    ///
    /// The timestamp is truncated to microseconds, the precision of the
    /// database column.
    pub fn new(sender: Uuid, recipient: Uuid, content: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            sender,
            recipient,
            content,
            timestamp: Utc::now().trunc_subsecs(6),
        }
    }

    /// Whether the sender wrote to themselves.
    pub fn is_self_message(&self) -> bool {
        self.sender == self.recipient
    }
}

/// Sorts messages by timestamp, oldest first, breaking ties by id.
pub fn sort_chronologically(messages: &mut [Message]) {
    messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
}
