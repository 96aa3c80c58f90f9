use std::sync::Arc;

use crate::config::AppConfig;
use marginalia_core::domain::service::CommentService;
use marginalia_infra::db::comments_repo::PgCommentStore;
use marginalia_infra::db::posts_repo::{PgCommentCounter, PgPostDirectory};
use marginalia_infra::db::DbPool;
use marginalia_infra::notify::Notifier;

pub type Comments = CommentService<PgCommentStore, PgPostDirectory, PgCommentCounter, Notifier>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub comments: Arc<Comments>,
}
