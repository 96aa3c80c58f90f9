use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

pub const MAX_COMMENT_LEN: usize = 4096;

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub parent_comment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A comment as handed to the store. Identity and `created_at` are assigned
/// at insert time.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub parent_comment_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentPage {
    pub items: Vec<Comment>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
}
