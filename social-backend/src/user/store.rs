//! User persistence

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::model::User;
use crate::error::{DatabaseError, DatabaseOperation};

/// Storage the login flow and user routes depend on
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<User, DatabaseError>;

    /// Return the user with `email`, creating it with `username` if absent
    ///
    /// Concurrent calls for the same email converge on one row.
    async fn find_or_create(&self, email: &str, username: &str) -> Result<User, DatabaseError>;
}

/// PostgreSQL-backed [`UserStore`]
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, email, created_at, updated_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    #[tracing::instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, email, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            DatabaseError::not_found(DatabaseOperation::Query, "User not found")
                .add_context(format!("users.id = {}", id))
        })
    }

    #[tracing::instrument(skip(self))]
    async fn find_or_create(&self, email: &str, username: &str) -> Result<User, DatabaseError> {
        if let Some(user) = self.find_by_email(email).await? {
            tracing::info!(email, username = %user.username, "User found by email");
            return Ok(user);
        }

        // the no-op update makes RETURNING yield the row a concurrent insert won with
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, username)
            VALUES ($1, $2)
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING id, username, email, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::from(e).during(DatabaseOperation::Insert))?;

        tracing::info!(email, user_id = %user.id, "User created");
        Ok(user)
    }
}
