use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::{Row, error::SqlState};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::user::User,
};

/// Persistence for user records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a new user. Fails with `DuplicateUser` if the username is taken.
    async fn insert(&self, user: &User) -> Result<()>;

    /// Finds a user by their username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Finds a user by their ID.
    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>>;
}

/// A helper function to map a `tokio_postgres::Row` to a `User`.
fn row_to_user(row: &Row) -> Result<User> {
    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password: row.try_get("password")?,
        created_at: row.try_get("created_at")?,
    })
}

/// PostgreSQL-backed user repository.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: Pool,
}

impl PgUserRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, user: &User) -> Result<()> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(
                r#"
                INSERT INTO users (id, username, password, created_at)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .await?;

        client
            .execute(
                &statement,
                &[&user.id, &user.username, &user.password, &user.created_at],
            )
            .await
            .map_err(|e| {
                if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                    AppError::DuplicateUser(user.username.clone())
                } else {
                    AppError::Database(e)
                }
            })?;
        Ok(())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(
                r#"
                SELECT id, username, password, created_at
                FROM users
                WHERE username = $1
                "#,
            )
            .await?;
        let row = client.query_opt(&statement, &[&username]).await?;
        row.map(|r| row_to_user(&r)).transpose()
    }

    async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached(
                r#"
                SELECT id, username, password, created_at
                FROM users
                WHERE id = $1
                "#,
            )
            .await?;
        let row = client.query_opt(&statement, &[&user_id]).await?;
        row.map(|r| row_to_user(&r)).transpose()
    }
}
