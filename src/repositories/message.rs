use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;

use crate::{error::Result, models::message::Message};

const MESSAGE_COLUMNS: &str = r#"id, sender, recipient, content, "timestamp""#;

/// Persistence for directed messages.
///
/// Implementations return raw rows; ordering and de-duplication are the
/// caller's concern.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Stores a message.
    async fn insert(&self, message: &Message) -> Result<()>;

    /// Every message sent from `a` to `b` or from `b` to `a`.
    async fn find_between(&self, a: Uuid, b: Uuid) -> Result<Vec<Message>>;

    /// Every message sent by `user_id`.
    async fn find_by_sender(&self, user_id: Uuid) -> Result<Vec<Message>>;

    /// Every message received by `user_id`.
    async fn find_by_recipient(&self, user_id: Uuid) -> Result<Vec<Message>>;
}

fn row_to_message(row: &Row) -> Result<Message> {
    Ok(Message {
        id: row.try_get("id")?,
        sender: row.try_get("sender")?,
        recipient: row.try_get("recipient")?,
        content: row.try_get("content")?,
        timestamp: row.try_get("timestamp")?,
    })
}

/// PostgreSQL-backed message repository.
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: Pool,
}

impl PgMessageRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn query_messages(
        &self,
        query: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<Vec<Message>> {
        let client = self.pool.get().await?;
        let statement = client.prepare_cached(query).await?;
        let rows = client.query(&statement, params).await?;
        rows.iter().map(row_to_message).collect()
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn insert(&self, message: &Message) -> Result<()> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(
                r#"
                INSERT INTO messages (id, sender, recipient, content, "timestamp")
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .await?;
        client
            .execute(
                &statement,
                &[
                    &message.id,
                    &message.sender,
                    &message.recipient,
                    &message.content,
                    &message.timestamp,
                ],
            )
            .await?;
        Ok(())
    }

    async fn find_between(&self, a: Uuid, b: Uuid) -> Result<Vec<Message>> {
        let query = format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE (sender = $1 AND recipient = $2) OR (sender = $2 AND recipient = $1)
            ORDER BY "timestamp" ASC, id ASC
            "#
        );
        self.query_messages(&query, &[&a, &b]).await
    }

    async fn find_by_sender(&self, user_id: Uuid) -> Result<Vec<Message>> {
        let query = format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE sender = $1
            "#
        );
        self.query_messages(&query, &[&user_id]).await
    }

    async fn find_by_recipient(&self, user_id: Uuid) -> Result<Vec<Message>> {
        let query = format!(
            r#"
            SELECT {MESSAGE_COLUMNS}
            FROM messages
            WHERE recipient = $1
            "#
        );
        self.query_messages(&query, &[&user_id]).await
    }
}
