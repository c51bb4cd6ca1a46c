use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::Row;

use crate::{error::Result, models::session::Session};

/// Persistence for bearer-token sessions.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Stores a freshly issued session.
    async fn insert(&self, session: &Session) -> Result<()>;

    /// Looks a session up by its token.
    async fn find_by_token(&self, token: &str) -> Result<Option<Session>>;
}

fn row_to_session(row: &Row) -> Result<Session> {
    Ok(Session {
        id: row.try_get("id")?,
        token: row.try_get("token")?,
        user_id: row.try_get("user_id")?,
        created_at: row.try_get("created_at")?,
    })
}

/// PostgreSQL-backed session repository.
#[derive(Clone)]
pub struct PgSessionRepository {
    pool: Pool,
}

impl PgSessionRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn insert(&self, session: &Session) -> Result<()> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(
                r#"
                INSERT INTO sessions (id, "token", user_id, created_at)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .await?;
        client
            .execute(
                &statement,
                &[&session.id, &session.token, &session.user_id, &session.created_at],
            )
            .await?;
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Session>> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(
                r#"
                SELECT id, "token", user_id, created_at
                FROM sessions
                WHERE "token" = $1
                "#,
            )
            .await?;
        let row = client.query_opt(&statement, &[&token]).await?;
        row.map(|r| row_to_session(&r)).transpose()
    }
}
