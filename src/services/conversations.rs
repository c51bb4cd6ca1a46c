//! Shapes a user's raw message set into per-correspondent conversations.

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::message::{Message, sort_chronologically},
};

/// Name substituted for ids that cannot be resolved under
/// [`UnresolvedNamePolicy::Placeholder`].
pub const PLACEHOLDER_NAME: &str = "";

/// Resolves a user id to its display name.
#[async_trait]
pub trait NameResolver: Send + Sync {
    /// Returns `NotFound` for unknown ids; any other error is a storage
    /// failure.
    async fn resolve_username(&self, user_id: Uuid) -> Result<String>;
}

/// What to do when a message references a user id with no matching user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnresolvedNamePolicy {
    /// Fail the whole request with `AppError::Resolution`.
    #[default]
    Fail,
    /// Use [`PLACEHOLDER_NAME`] and log a warning.
    Placeholder,
}

impl FromStr for UnresolvedNamePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(UnresolvedNamePolicy::Fail),
            "placeholder" => Ok(UnresolvedNamePolicy::Placeholder),
            other => anyhow::bail!(
                "unknown UNRESOLVED_NAME_POLICY '{}' (expected fail or placeholder)",
                other
            ),
        }
    }
}

/// A message as shown to clients: both ends by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct MessageView {
    pub sender_username: String,
    pub recipient_username: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Partner display name to that conversation's messages, oldest first.
///
/// Buckets iterate (and serialize) in name order.
pub type Conversations = BTreeMap<String, Vec<MessageView>>;

/// The user on the other end of `message` from `user_id`'s point of view.
///
/// A self-message's partner is the user themselves.
pub fn partner_of(user_id: Uuid, message: &Message) -> Uuid {
    if message.is_self_message() && message.sender == user_id {
        user_id
    } else if message.recipient == user_id {
        message.sender
    } else {
        message.recipient
    }
}

/// Turns raw messages into display-ready structures.
///
/// Each distinct user id is resolved at most once per assembler.
pub struct ConversationAssembler<'a, R: NameResolver + ?Sized> {
    resolver: &'a R,
    policy: UnresolvedNamePolicy,
    names: HashMap<Uuid, String>,
}

impl<'a, R: NameResolver + ?Sized> ConversationAssembler<'a, R> {
    pub fn new(resolver: &'a R, policy: UnresolvedNamePolicy) -> Self {
        Self {
            resolver,
            policy,
            names: HashMap::new(),
        }
    }

    /// Groups `messages` by conversational partner of `user_id`.
    ///
    /// Every message lands in exactly one bucket, once. Self-messages go in
    /// the bucket named after `user_id`.
    pub async fn assemble(
        &mut self,
        user_id: Uuid,
        mut messages: Vec<Message>,
    ) -> Result<Conversations> {
        self.resolve_all(std::iter::once(user_id)).await?;
        self.resolve_participants(&messages).await?;

        sort_chronologically(&mut messages);

        let mut conversations = Conversations::new();
        for message in messages {
            let partner = self.name_of(partner_of(user_id, &message));
            let view = self.view(message);
            conversations.entry(partner).or_default().push(view);
        }

        tracing::debug!(
            "💬 Assembled {} conversation(s) for user {}",
            conversations.len(),
            user_id
        );
        Ok(conversations)
    }

    /// Renders a single thread, oldest first.
    pub async fn thread(&mut self, mut messages: Vec<Message>) -> Result<Vec<MessageView>> {
        self.resolve_participants(&messages).await?;
        sort_chronologically(&mut messages);
        Ok(messages.into_iter().map(|m| self.view(m)).collect())
    }

    async fn resolve_participants(&mut self, messages: &[Message]) -> Result<()> {
        let ids: Vec<Uuid> = messages
            .iter()
            .flat_map(|m| [m.sender, m.recipient])
            .collect();
        self.resolve_all(ids).await
    }

    async fn resolve_all<I>(&mut self, ids: I) -> Result<()>
    where
        I: IntoIterator<Item = Uuid>,
    {
        for id in ids {
            if self.names.contains_key(&id) {
                continue;
            }
            let name = self.resolve(id).await?;
            self.names.insert(id, name);
        }
        Ok(())
    }

    async fn resolve(&self, user_id: Uuid) -> Result<String> {
        match self.resolver.resolve_username(user_id).await {
            Ok(name) => Ok(name),
            Err(AppError::NotFound(_)) => match self.policy {
                UnresolvedNamePolicy::Fail => Err(AppError::Resolution(user_id)),
                UnresolvedNamePolicy::Placeholder => {
                    tracing::warn!("⚠️ No user for id {}, using placeholder name", user_id);
                    Ok(PLACEHOLDER_NAME.to_string())
                }
            },
            Err(e) => Err(e),
        }
    }

    fn name_of(&self, user_id: Uuid) -> String {
        self.names.get(&user_id).cloned().unwrap_or_default()
    }

    fn view(&self, message: Message) -> MessageView {
        MessageView {
            sender_username: self.name_of(message.sender),
            recipient_username: self.name_of(message.recipient),
            content: message.content,
            timestamp: message.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::sync::Mutex;

    /// Resolver over a fixed map that records every lookup.
    struct FakeResolver {
        names: HashMap<Uuid, String>,
        lookups: Mutex<Vec<Uuid>>,
        fail_storage: bool,
    }

    impl FakeResolver {
        fn new(users: &[(Uuid, &str)]) -> Self {
            Self {
                names: users.iter().map(|(id, n)| (*id, n.to_string())).collect(),
                lookups: Mutex::new(Vec::new()),
                fail_storage: false,
            }
        }

        fn lookups(&self) -> Vec<Uuid> {
            self.lookups.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NameResolver for FakeResolver {
        async fn resolve_username(&self, user_id: Uuid) -> Result<String> {
            self.lookups.lock().unwrap().push(user_id);
            if self.fail_storage {
                return Err(AppError::Storage("timeout".to_string()));
            }
            self.names
                .get(&user_id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("User {}", user_id)))
        }
    }

    fn message_at(sender: Uuid, recipient: Uuid, content: &str, seconds: i64) -> Message {
        Message {
            id: Uuid::now_v7(),
            sender,
            recipient,
            content: content.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
                + Duration::seconds(seconds),
        }
    }

    fn contents(views: &[MessageView]) -> Vec<&str> {
        views.iter().map(|v| v.content.as_str()).collect()
    }

    #[test]
    fn test_partner_of() {
        let alice = Uuid::now_v7();
        let bob = Uuid::now_v7();

        assert_eq!(partner_of(alice, &message_at(alice, bob, "out", 0)), bob);
        assert_eq!(partner_of(alice, &message_at(bob, alice, "in", 0)), bob);
        assert_eq!(partner_of(alice, &message_at(alice, alice, "self", 0)), alice);
    }

    #[tokio::test]
    async fn test_groups_by_partner_in_time_order() {
        let alice = Uuid::now_v7();
        let bob = Uuid::now_v7();
        let carol = Uuid::now_v7();
        let resolver = FakeResolver::new(&[(alice, "alice"), (bob, "bob"), (carol, "carol")]);

        // Unordered input, as a set would be.
        let messages = vec![
            message_at(bob, alice, "bob 2", 20),
            message_at(alice, carol, "carol 1", 5),
            message_at(alice, bob, "bob 1", 10),
            message_at(carol, alice, "carol 2", 40),
            message_at(alice, bob, "bob 3", 30),
        ];

        let conversations = ConversationAssembler::new(&resolver, UnresolvedNamePolicy::Fail)
            .assemble(alice, messages)
            .await
            .unwrap();

        let partners: Vec<&str> = conversations.keys().map(String::as_str).collect();
        assert_eq!(partners, vec!["bob", "carol"]);
        assert_eq!(contents(&conversations["bob"]), vec!["bob 1", "bob 2", "bob 3"]);
        assert_eq!(contents(&conversations["carol"]), vec!["carol 1", "carol 2"]);

        let incoming = &conversations["bob"][1];
        assert_eq!(incoming.sender_username, "bob");
        assert_eq!(incoming.recipient_username, "alice");
    }

    #[tokio::test]
    async fn test_self_message_lands_once_in_own_bucket() {
        let alice = Uuid::now_v7();
        let bob = Uuid::now_v7();
        let resolver = FakeResolver::new(&[(alice, "alice"), (bob, "bob")]);

        let messages = vec![
            message_at(alice, alice, "note to self", 0),
            message_at(alice, bob, "hi", 1),
        ];

        let conversations = ConversationAssembler::new(&resolver, UnresolvedNamePolicy::Fail)
            .assemble(alice, messages)
            .await
            .unwrap();

        assert_eq!(conversations.len(), 2);
        assert_eq!(contents(&conversations["alice"]), vec!["note to self"]);
        assert_eq!(conversations["alice"][0].sender_username, "alice");
        assert_eq!(conversations["alice"][0].recipient_username, "alice");
        assert_eq!(contents(&conversations["bob"]), vec!["hi"]);

        let total: usize = conversations.values().map(Vec::len).sum();
        assert_eq!(total, 2);
    }

    #[tokio::test]
    async fn test_each_id_is_resolved_once() {
        let alice = Uuid::now_v7();
        let bob = Uuid::now_v7();
        let resolver = FakeResolver::new(&[(alice, "alice"), (bob, "bob")]);

        let messages = (0..10)
            .map(|i| {
                if i % 2 == 0 {
                    message_at(alice, bob, "ping", i)
                } else {
                    message_at(bob, alice, "pong", i)
                }
            })
            .collect();

        ConversationAssembler::new(&resolver, UnresolvedNamePolicy::Fail)
            .assemble(alice, messages)
            .await
            .unwrap();

        let mut lookups = resolver.lookups();
        lookups.sort();
        let mut expected = vec![alice, bob];
        expected.sort();
        assert_eq!(lookups, expected);
    }

    #[tokio::test]
    async fn test_empty_history() {
        let alice = Uuid::now_v7();
        let resolver = FakeResolver::new(&[(alice, "alice")]);

        let conversations = ConversationAssembler::new(&resolver, UnresolvedNamePolicy::Fail)
            .assemble(alice, Vec::new())
            .await
            .unwrap();
        assert!(conversations.is_empty());
    }

    #[tokio::test]
    async fn test_unresolved_id_fails_under_fail_policy() {
        let alice = Uuid::now_v7();
        let ghost = Uuid::now_v7();
        let resolver = FakeResolver::new(&[(alice, "alice")]);

        let err = ConversationAssembler::new(&resolver, UnresolvedNamePolicy::Fail)
            .assemble(alice, vec![message_at(ghost, alice, "boo", 0)])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Resolution(id) if id == ghost));
    }

    #[tokio::test]
    async fn test_unresolved_id_uses_placeholder_under_placeholder_policy() {
        let alice = Uuid::now_v7();
        let ghost = Uuid::now_v7();
        let resolver = FakeResolver::new(&[(alice, "alice")]);

        let conversations = ConversationAssembler::new(&resolver, UnresolvedNamePolicy::Placeholder)
            .assemble(alice, vec![message_at(ghost, alice, "boo", 0)])
            .await
            .unwrap();

        let bucket = &conversations[PLACEHOLDER_NAME];
        assert_eq!(bucket[0].sender_username, PLACEHOLDER_NAME);
        assert_eq!(bucket[0].recipient_username, "alice");
    }

    #[tokio::test]
    async fn test_storage_errors_are_never_masked() {
        let alice = Uuid::now_v7();
        let mut resolver = FakeResolver::new(&[(alice, "alice")]);
        resolver.fail_storage = true;

        let err = ConversationAssembler::new(&resolver, UnresolvedNamePolicy::Placeholder)
            .assemble(alice, Vec::new())
            .await
            .unwrap_err();
        assert!(err.is_storage());
    }

    #[tokio::test]
    async fn test_thread_is_ordered() {
        let alice = Uuid::now_v7();
        let bob = Uuid::now_v7();
        let resolver = FakeResolver::new(&[(alice, "alice"), (bob, "bob")]);

        let thread = ConversationAssembler::new(&resolver, UnresolvedNamePolicy::Fail)
            .thread(vec![
                message_at(bob, alice, "reply", 5),
                message_at(alice, bob, "hello", 1),
            ])
            .await
            .unwrap();

        assert_eq!(contents(&thread), vec!["hello", "reply"]);
        assert_eq!(thread[1].sender_username, "bob");
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("fail".parse::<UnresolvedNamePolicy>().unwrap(), UnresolvedNamePolicy::Fail);
        assert_eq!(
            " Placeholder ".parse::<UnresolvedNamePolicy>().unwrap(),
            UnresolvedNamePolicy::Placeholder
        );
        assert!("ignore".parse::<UnresolvedNamePolicy>().is_err());
    }
}
