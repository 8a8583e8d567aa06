//! Post persistence

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::model::Post;
use crate::error::{DatabaseError, DatabaseOperation};

#[async_trait]
pub trait PostStore: Send + Sync {
    /// Every post, newest first
    async fn get_all(&self) -> Result<Vec<Post>, DatabaseError>;
    async fn get_by_id(&self, id: Uuid) -> Result<Post, DatabaseError>;
    async fn create(&self, title: &str, content: &str) -> Result<Post, DatabaseError>;
    async fn update(&self, id: Uuid, title: &str, content: &str) -> Result<Post, DatabaseError>;
    /// Deleting a missing post is not an error
    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError>;
}

/// PostgreSQL-backed [`PostStore`]
#[derive(Clone)]
pub struct PgPostStore {
    pool: PgPool,
}

impl PgPostStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn post_not_found(operation: DatabaseOperation, id: Uuid) -> DatabaseError {
    DatabaseError::not_found(operation, "Post not found").add_context(format!("posts.id = {}", id))
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn get_all(&self) -> Result<Vec<Post>, DatabaseError> {
        let posts = sqlx::query_as::<_, Post>(
            "SELECT id, title, content, created_at, updated_at FROM posts ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(posts)
    }

    #[tracing::instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> Result<Post, DatabaseError> {
        sqlx::query_as::<_, Post>(
            "SELECT id, title, content, created_at, updated_at FROM posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| post_not_found(DatabaseOperation::Query, id))
    }

    #[tracing::instrument(skip(self, content))]
    async fn create(&self, title: &str, content: &str) -> Result<Post, DatabaseError> {
        sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (title, content)
            VALUES ($1, $2)
            RETURNING id, title, content, created_at, updated_at
            "#,
        )
        .bind(title)
        .bind(content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::from(e).during(DatabaseOperation::Insert))
    }

    #[tracing::instrument(skip(self, content))]
    async fn update(&self, id: Uuid, title: &str, content: &str) -> Result<Post, DatabaseError> {
        sqlx::query_as::<_, Post>(
            r#"
            UPDATE posts
            SET title = $2, content = $3, updated_at = now()
            WHERE id = $1
            RETURNING id, title, content, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(content)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DatabaseError::from(e).during(DatabaseOperation::Update))?
        .ok_or_else(|| post_not_found(DatabaseOperation::Update, id))
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::from(e).during(DatabaseOperation::Delete))?;

        tracing::debug!(rows = result.rows_affected(), "Post delete executed");
        Ok(())
    }
}
