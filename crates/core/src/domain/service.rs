use std::future::Future;
use std::time::Duration;

use tracing::warn;
use uuid::Uuid;

use crate::domain::comments::{Comment, CommentPage, NewComment, MAX_COMMENT_LEN};
use crate::error::{CommentError, DispatchFailure};

/// Durable storage for comment records.
pub trait CommentStore: Send + Sync {
    fn insert(
        &self,
        comment: NewComment,
    ) -> impl Future<Output = Result<Comment, CommentError>> + Send;

    /// Comments on a post ordered by `created_at` ascending. The same
    /// offset/limit window always yields the same slice of the ordering.
    fn list_by_post(
        &self,
        post_id: Uuid,
        offset: i64,
        limit: i64,
    ) -> impl Future<Output = Result<Vec<Comment>, CommentError>> + Send;

    fn count_by_post(&self, post_id: Uuid)
    -> impl Future<Output = Result<i64, CommentError>> + Send;

    fn find_by_id(
        &self,
        comment_id: Uuid,
    ) -> impl Future<Output = Result<Option<Comment>, CommentError>> + Send;

    /// Removes exactly the addressed comment. Deleting an id that is already
    /// gone is a `NotFound`, not a silent success.
    fn delete_by_id(
        &self,
        comment_id: Uuid,
    ) -> impl Future<Output = Result<(), CommentError>> + Send;
}

/// Lookup into the externally owned posts collection.
pub trait PostDirectory: Send + Sync {
    fn post_exists(&self, post_id: Uuid)
    -> impl Future<Output = Result<bool, CommentError>> + Send;

    fn post_owner(
        &self,
        post_id: Uuid,
    ) -> impl Future<Output = Result<Option<Uuid>, CommentError>> + Send;
}

/// Denormalized `comments_count` maintenance on the parent post.
///
/// Implementations must apply the delta atomically at the storage layer
/// (a single arithmetic update, never read-modify-write) and clamp the
/// result at zero.
pub trait CommentCounter: Send + Sync {
    fn adjust(
        &self,
        post_id: Uuid,
        delta: i64,
    ) -> impl Future<Output = Result<(), CommentError>> + Send;
}

/// Outbound notification to the post owner. Best-effort: the service bounds
/// the call with a timeout and swallows any failure.
pub trait NotificationDispatcher: Send + Sync {
    fn notify_new_comment(
        &self,
        owner_id: Uuid,
        comment_id: Uuid,
        post_id: Uuid,
        actor_id: Uuid,
    ) -> impl Future<Output = Result<(), DispatchFailure>> + Send;
}

pub struct CommentService<S, P, C, N> {
    store: S,
    posts: P,
    counter: C,
    notifier: N,
    notify_timeout: Duration,
}

impl<S, P, C, N> CommentService<S, P, C, N>
where
    S: CommentStore,
    P: PostDirectory,
    C: CommentCounter,
    N: NotificationDispatcher,
{
    pub fn new(store: S, posts: P, counter: C, notifier: N, notify_timeout: Duration) -> Self {
        Self {
            store,
            posts,
            counter,
            notifier,
            notify_timeout,
        }
    }

    /// Creates a comment on an existing post, bumps the post's comment
    /// counter and notifies the post owner.
    ///
    /// The counter increment is attempted exactly once per successful
    /// insert; if it fails the error is surfaced but the inserted comment is
    /// kept (the count heals by reconciliation, not rollback). Notification
    /// is attempted at most once and its outcome never affects the result.
    pub async fn create_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        text: &str,
        parent_comment_id: Option<Uuid>,
    ) -> Result<Comment, CommentError> {
        let text = normalize_text(text)?;
        if !self.posts.post_exists(post_id).await? {
            return Err(CommentError::NotFound("post"));
        }
        if let Some(parent_id) = parent_comment_id {
            let parent = self
                .store
                .find_by_id(parent_id)
                .await?
                .ok_or_else(|| CommentError::Validation("parent comment does not exist".into()))?;
            if parent.post_id != post_id {
                return Err(CommentError::Validation(
                    "parent comment belongs to a different post".into(),
                ));
            }
        }
        let comment = self
            .store
            .insert(NewComment {
                post_id,
                author_id,
                text,
                parent_comment_id,
            })
            .await?;
        self.counter.adjust(post_id, 1).await?;
        self.dispatch_new_comment(&comment).await;
        Ok(comment)
    }

    pub async fn list_comments(
        &self,
        post_id: Uuid,
        page: u32,
        limit: u32,
    ) -> Result<CommentPage, CommentError> {
        if page == 0 {
            return Err(CommentError::Validation("page must be at least 1".into()));
        }
        if limit == 0 {
            return Err(CommentError::Validation("limit must be at least 1".into()));
        }
        let offset = i64::from(page - 1) * i64::from(limit);
        let items = self
            .store
            .list_by_post(post_id, offset, i64::from(limit))
            .await?;
        let total = self.store.count_by_post(post_id).await?;
        Ok(CommentPage {
            items,
            total,
            page,
            limit,
        })
    }

    /// Author-only delete. Removes the comment and decrements the post's
    /// counter (clamped at zero). Replies are not cascaded; they surface as
    /// top-level comments once their parent is gone.
    pub async fn delete_comment(
        &self,
        comment_id: Uuid,
        requesting_user_id: Uuid,
    ) -> Result<(), CommentError> {
        let comment = self
            .store
            .find_by_id(comment_id)
            .await?
            .ok_or(CommentError::NotFound("comment"))?;
        if comment.author_id != requesting_user_id {
            return Err(CommentError::Forbidden(
                "only the comment author may delete it",
            ));
        }
        self.store.delete_by_id(comment_id).await?;
        self.counter.adjust(comment.post_id, -1).await?;
        Ok(())
    }

    async fn dispatch_new_comment(&self, comment: &Comment) {
        let owner = match self.posts.post_owner(comment.post_id).await {
            Ok(Some(owner)) => owner,
            Ok(None) => {
                warn!(post_id = %comment.post_id, "post owner vanished before notification");
                return;
            }
            Err(err) => {
                warn!(error = %err, post_id = %comment.post_id, "owner lookup failed, skipping notification");
                return;
            }
        };
        if owner == comment.author_id {
            return;
        }
        let dispatch = self.notifier.notify_new_comment(
            owner,
            comment.id,
            comment.post_id,
            comment.author_id,
        );
        match tokio::time::timeout(self.notify_timeout, dispatch).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                warn!(error = %err, comment_id = %comment.id, "comment notification failed");
            }
            Err(_) => {
                warn!(comment_id = %comment.id, "comment notification timed out");
            }
        }
    }
}

fn normalize_text(text: &str) -> Result<String, CommentError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CommentError::Validation("text must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_COMMENT_LEN {
        return Err(CommentError::Validation(format!(
            "text exceeds {MAX_COMMENT_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}
