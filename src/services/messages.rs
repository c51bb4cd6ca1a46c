use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::Result,
    models::message::{Message, sort_chronologically},
    repositories::message::MessageRepository,
};

/// Stores messages and answers the two history queries.
#[derive(Clone)]
pub struct MessageStore {
    messages: Arc<dyn MessageRepository>,
}

impl MessageStore {
    pub fn new(messages: Arc<dyn MessageRepository>) -> Self {
        Self { messages }
    }

    /// Persists a new message from `sender_id` to `recipient_id`.
    ///
    /// # Returns
    ///
    /// The stored `Message`, with its generated id and timestamp.
    pub async fn save(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        content: &str,
    ) -> Result<Message> {
        let message = Message::new(sender_id, recipient_id, content.to_string());
        self.messages.insert(&message).await?;
        tracing::debug!(
            "✉️ Message {} saved: {} -> {}",
            message.id,
            sender_id,
            recipient_id
        );
        Ok(message)
    }

    /// Every message exchanged between two users, in either direction,
    /// oldest first. Argument order does not matter.
    pub async fn messages_between(&self, user_a: Uuid, user_b: Uuid) -> Result<Vec<Message>> {
        let mut messages = self.messages.find_between(user_a, user_b).await?;
        sort_chronologically(&mut messages);
        Ok(messages)
    }

    /// Every message the user sent or received, each exactly once, oldest
    /// first.
    pub async fn messages_for_user(&self, user_id: Uuid) -> Result<Vec<Message>> {
        let (sent, received) = tokio::try_join!(
            self.messages.find_by_sender(user_id),
            self.messages.find_by_recipient(user_id),
        )?;
        Ok(merge_by_id(sent, received))
    }
}

/// Unions two result sets, keeping one copy of each message id.
///
/// Self-messages come back from both the by-sender and by-recipient queries.
pub fn merge_by_id(sent: Vec<Message>, received: Vec<Message>) -> Vec<Message> {
    let mut by_id: HashMap<Uuid, Message> = HashMap::with_capacity(sent.len() + received.len());
    for message in sent.into_iter().chain(received) {
        by_id.entry(message.id).or_insert(message);
    }

    let mut messages: Vec<Message> = by_id.into_values().collect();
    sort_chronologically(&mut messages);
    messages
}
