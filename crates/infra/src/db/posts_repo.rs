use sqlx::Row;
use thiserror::Error;
use uuid::Uuid;

use super::DbPool;
use marginalia_core::domain::service::{CommentCounter, PostDirectory};
use marginalia_core::error::CommentError;

#[derive(Debug, Error)]
pub enum PostsRepoError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct PgPostDirectory {
    pool: DbPool,
}

impl PgPostDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, post_id: Uuid) -> Result<bool, PostsRepoError> {
        let row = sqlx::query(
            r#"
            SELECT 1
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    async fn owner(&self, post_id: Uuid) -> Result<Option<Uuid>, PostsRepoError> {
        let row = sqlx::query(
            r#"
            SELECT owner_id
            FROM posts
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(Some(row.try_get("owner_id")?)),
            None => Ok(None),
        }
    }
}

impl PostDirectory for PgPostDirectory {
    async fn post_exists(&self, post_id: Uuid) -> Result<bool, CommentError> {
        self.exists(post_id).await.map_err(CommentError::storage)
    }

    async fn post_owner(&self, post_id: Uuid) -> Result<Option<Uuid>, CommentError> {
        self.owner(post_id).await.map_err(CommentError::storage)
    }
}

#[derive(Debug, Clone)]
pub struct PgCommentCounter {
    pool: DbPool,
}

impl PgCommentCounter {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Single arithmetic update, clamped at zero in SQL. Never
    /// read-modify-write.
    async fn apply(&self, post_id: Uuid, delta: i64) -> Result<u64, PostsRepoError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET comments_count = GREATEST(comments_count + $2, 0)
            WHERE id = $1
            "#,
        )
        .bind(post_id)
        .bind(delta)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

impl CommentCounter for PgCommentCounter {
    async fn adjust(&self, post_id: Uuid, delta: i64) -> Result<(), CommentError> {
        let rows = self
            .apply(post_id, delta)
            .await
            .map_err(CommentError::storage)?;
        // Missing post is only an error when incrementing.
        if rows == 0 && delta > 0 {
            return Err(CommentError::NotFound("post"));
        }
        Ok(())
    }
}
