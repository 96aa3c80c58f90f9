use sqlx::Row;
use thiserror::Error;
use uuid::Uuid;

use super::DbPool;
use marginalia_core::domain::comments::{Comment, NewComment};
use marginalia_core::domain::service::CommentStore;
use marginalia_core::error::CommentError;

#[derive(Debug, Error)]
pub enum CommentsRepoError {
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

#[derive(Debug, Clone)]
pub struct PgCommentStore {
    pool: DbPool,
}

impl PgCommentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn insert_row(&self, comment: NewComment) -> Result<Comment, CommentsRepoError> {
        let id = Uuid::new_v4();
        let row = sqlx::query(
            r#"
            INSERT INTO comments (id, post_id, author_id, text, parent_comment_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING created_at
            "#,
        )
        .bind(id)
        .bind(comment.post_id)
        .bind(comment.author_id)
        .bind(&comment.text)
        .bind(comment.parent_comment_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(Comment {
            id,
            post_id: comment.post_id,
            author_id: comment.author_id,
            text: comment.text,
            parent_comment_id: comment.parent_comment_id,
            created_at: row.try_get("created_at")?,
        })
    }

    async fn list_rows(
        &self,
        post_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Comment>, CommentsRepoError> {
        let rows = sqlx::query(
            r#"
            SELECT id, post_id, author_id, text, parent_comment_id, created_at
            FROM comments
            WHERE post_id = $1
            ORDER BY created_at ASC, id ASC
            OFFSET $2
            LIMIT $3
            "#,
        )
        .bind(post_id)
        .bind(offset)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        let mut comments = Vec::with_capacity(rows.len());
        for row in rows {
            comments.push(Comment {
                id: row.try_get("id")?,
                post_id: row.try_get("post_id")?,
                author_id: row.try_get("author_id")?,
                text: row.try_get("text")?,
                parent_comment_id: row.try_get("parent_comment_id")?,
                created_at: row.try_get("created_at")?,
            });
        }
        Ok(comments)
    }

    async fn count_rows(&self, post_id: Uuid) -> Result<i64, CommentsRepoError> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS count
            FROM comments
            WHERE post_id = $1
            "#,
        )
        .bind(post_id)
        .fetch_one(&self.pool)
        .await?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    async fn find_row(&self, comment_id: Uuid) -> Result<Option<Comment>, CommentsRepoError> {
        let row = sqlx::query(
            r#"
            SELECT id, post_id, author_id, text, parent_comment_id, created_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(Some(Comment {
                id: row.try_get("id")?,
                post_id: row.try_get("post_id")?,
                author_id: row.try_get("author_id")?,
                text: row.try_get("text")?,
                parent_comment_id: row.try_get("parent_comment_id")?,
                created_at: row.try_get("created_at")?,
            })),
            None => Ok(None),
        }
    }

    async fn delete_row(&self, comment_id: Uuid) -> Result<bool, CommentsRepoError> {
        let result = sqlx::query(
            r#"
            DELETE FROM comments
            WHERE id = $1
            "#,
        )
        .bind(comment_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

impl CommentStore for PgCommentStore {
    async fn insert(&self, comment: NewComment) -> Result<Comment, CommentError> {
        self.insert_row(comment).await.map_err(CommentError::storage)
    }

    async fn list_by_post(
        &self,
        post_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Comment>, CommentError> {
        self.list_rows(post_id, offset, limit)
            .await
            .map_err(CommentError::storage)
    }

    async fn count_by_post(&self, post_id: Uuid) -> Result<i64, CommentError> {
        self.count_rows(post_id).await.map_err(CommentError::storage)
    }

    async fn find_by_id(&self, comment_id: Uuid) -> Result<Option<Comment>, CommentError> {
        self.find_row(comment_id).await.map_err(CommentError::storage)
    }

    async fn delete_by_id(&self, comment_id: Uuid) -> Result<(), CommentError> {
        let deleted = self
            .delete_row(comment_id)
            .await
            .map_err(CommentError::storage)?;
        if !deleted {
            return Err(CommentError::NotFound("comment"));
        }
        Ok(())
    }
}
