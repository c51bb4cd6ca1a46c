use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::{message::Message, session::Session, user::User},
    repositories::{
        message::MessageRepository, session::SessionRepository, user::UserRepository,
    },
};

/// Process-local storage implementing every repository trait.
///
/// Enforces the same uniqueness rules as the database schema: usernames and
/// session tokens are unique, message ids are unique.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    sessions: RwLock<HashMap<String, Session>>,
    messages: RwLock<Vec<Message>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.username == user.username) {
            return Err(AppError::DuplicateUser(user.username.clone()));
        }
        if users.contains_key(&user.id) {
            return Err(AppError::Storage(format!("duplicate user id {}", user.id)));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn insert(&self, session: &Session) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.token) {
            return Err(AppError::Storage("duplicate session token".to_string()));
        }
        sessions.insert(session.token.clone(), session.clone());
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Session>> {
        Ok(self.sessions.read().await.get(token).cloned())
    }
}

#[async_trait]
impl MessageRepository for MemoryStore {
    async fn insert(&self, message: &Message) -> Result<()> {
        let mut messages = self.messages.write().await;
        if messages.iter().any(|m| m.id == message.id) {
            return Err(AppError::Storage(format!("duplicate message id {}", message.id)));
        }
        messages.push(message.clone());
        Ok(())
    }

    async fn find_between(&self, a: Uuid, b: Uuid) -> Result<Vec<Message>> {
        let messages = self.messages.read().await;
        Ok(messages
            .iter()
            .filter(|m| {
                (m.sender == a && m.recipient == b) || (m.sender == b && m.recipient == a)
            })
            .cloned()
            .collect())
    }

    async fn find_by_sender(&self, user_id: Uuid) -> Result<Vec<Message>> {
        let messages = self.messages.read().await;
        Ok(messages.iter().filter(|m| m.sender == user_id).cloned().collect())
    }

    async fn find_by_recipient(&self, user_id: Uuid) -> Result<Vec<Message>> {
        let messages = self.messages.read().await;
        Ok(messages.iter().filter(|m| m.recipient == user_id).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_username_is_unique() {
        let store = MemoryStore::new();
        UserRepository::insert(&store, &User::new("alice".into(), "pw1".into()))
            .await
            .unwrap();

        let err = UserRepository::insert(&store, &User::new("alice".into(), "other".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateUser(name) if name == "alice"));
    }

    #[tokio::test]
    async fn test_self_message_is_returned_by_both_queries() {
        let store = MemoryStore::new();
        let alice = Uuid::now_v7();
        let message = Message::new(alice, alice, "note to self".into());
        MessageRepository::insert(&store, &message).await.unwrap();

        assert_eq!(store.find_by_sender(alice).await.unwrap(), vec![message.clone()]);
        assert_eq!(store.find_by_recipient(alice).await.unwrap(), vec![message]);
    }
}
