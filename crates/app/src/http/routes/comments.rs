use axum::extract::{FromRequestParts, Path, Query, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

use crate::state::AppState;
use marginalia_core::domain::comments::{Comment, CommentPage};
use marginalia_core::error::CommentError;

const USER_ID_HEADER: &str = "x-user-id";
const DEFAULT_PAGE_LIMIT: u32 = 20;

#[derive(Debug, Error)]
pub enum CommentsApiError {
    #[error("post_id is required")]
    MissingPostId,
    #[error("{USER_ID_HEADER} header is required")]
    MissingUserId,
    #[error("{USER_ID_HEADER} header is invalid")]
    InvalidUserId,
    #[error(transparent)]
    Comment(#[from] CommentError),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Requester identity, as established by the upstream authentication layer.
#[derive(Debug, Clone, Copy)]
pub struct RequesterId(pub Uuid);

impl<S> FromRequestParts<S> for RequesterId
where
    S: Send + Sync,
{
    type Rejection = CommentsApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or(CommentsApiError::MissingUserId)?;
        let value = value
            .to_str()
            .map_err(|_| CommentsApiError::InvalidUserId)?;
        let id = value
            .trim()
            .parse()
            .map_err(|_| CommentsApiError::InvalidUserId)?;
        Ok(RequesterId(id))
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub post_id: Option<Uuid>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn list_comments(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<CommentPage>, CommentsApiError> {
    let post_id = params.post_id.ok_or(CommentsApiError::MissingPostId)?;
    let page = params.page.unwrap_or(1);
    let limit = clamp_limit(params.limit, state.config.max_page_limit);
    let result = state.comments.list_comments(post_id, page, limit).await?;
    Ok(Json(result))
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentBody {
    pub post_id: Uuid,
    pub text: String,
    pub parent_comment_id: Option<Uuid>,
}

pub async fn create_comment(
    State(state): State<AppState>,
    RequesterId(author_id): RequesterId,
    Json(body): Json<CreateCommentBody>,
) -> Result<(StatusCode, Json<Comment>), CommentsApiError> {
    let comment = state
        .comments
        .create_comment(body.post_id, author_id, &body.text, body.parent_comment_id)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

#[derive(Debug, Serialize)]
pub struct DeletedBody {
    pub deleted: bool,
}

pub async fn delete_comment(
    State(state): State<AppState>,
    RequesterId(requesting_user_id): RequesterId,
    Path(comment_id): Path<Uuid>,
) -> Result<Json<DeletedBody>, CommentsApiError> {
    state
        .comments
        .delete_comment(comment_id, requesting_user_id)
        .await?;
    Ok(Json(DeletedBody { deleted: true }))
}

fn clamp_limit(requested: Option<u32>, max: u32) -> u32 {
    requested.unwrap_or(DEFAULT_PAGE_LIMIT).min(max)
}

impl IntoResponse for CommentsApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            CommentsApiError::MissingPostId | CommentsApiError::InvalidUserId => {
                StatusCode::BAD_REQUEST
            }
            CommentsApiError::MissingUserId => StatusCode::UNAUTHORIZED,
            CommentsApiError::Comment(err) => match err {
                CommentError::Validation(_) => StatusCode::BAD_REQUEST,
                CommentError::NotFound(_) => StatusCode::NOT_FOUND,
                CommentError::Forbidden(_) => StatusCode::FORBIDDEN,
                CommentError::Storage(_) => {
                    warn!(error = %err, "comments api storage error");
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        };
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;

    use super::{clamp_limit, CommentsApiError, DEFAULT_PAGE_LIMIT};
    use marginalia_core::error::CommentError;

    #[test]
    fn clamp_limit_defaults_and_caps() {
        assert_eq!(clamp_limit(None, 50), DEFAULT_PAGE_LIMIT);
        assert_eq!(clamp_limit(Some(10), 50), 10);
        assert_eq!(clamp_limit(Some(500), 50), 50);
    }

    #[test]
    fn error_statuses_follow_the_taxonomy() {
        let cases = [
            (CommentsApiError::MissingPostId, StatusCode::BAD_REQUEST),
            (CommentsApiError::MissingUserId, StatusCode::UNAUTHORIZED),
            (CommentsApiError::InvalidUserId, StatusCode::BAD_REQUEST),
            (
                CommentsApiError::Comment(CommentError::Validation("empty".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                CommentsApiError::Comment(CommentError::NotFound("post")),
                StatusCode::NOT_FOUND,
            ),
            (
                CommentsApiError::Comment(CommentError::Forbidden("not the author")),
                StatusCode::FORBIDDEN,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
