use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommentError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("forbidden: {0}")]
    Forbidden(&'static str),
    #[error("storage error: {0}")]
    Storage(Box<dyn std::error::Error + Send + Sync>),
}

impl CommentError {
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        CommentError::Storage(Box::new(err))
    }
}

/// Notification send failure. Never escapes the comment service; absorbed
/// and logged there.
#[derive(Debug, Error)]
#[error("dispatch failed: {0}")]
pub struct DispatchFailure(pub String);
