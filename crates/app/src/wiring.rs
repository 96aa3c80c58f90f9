use std::sync::Arc;

use reqwest::Client;
use thiserror::Error;

use crate::config::AppConfig;
use crate::state::AppState;
use marginalia_core::domain::service::CommentService;
use marginalia_infra::db::comments_repo::PgCommentStore;
use marginalia_infra::db::posts_repo::{PgCommentCounter, PgPostDirectory};
use marginalia_infra::db::{connect_lazy, DbPoolError};
use marginalia_infra::notify::{Notifier, WebhookNotifier};

#[derive(Debug, Error)]
pub enum WiringError {
    #[error("db error: {0}")]
    Db(#[from] DbPoolError),
    #[error("http client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

pub fn build_state(config: AppConfig) -> Result<AppState, WiringError> {
    let pool = connect_lazy(&config.database_url)?;
    let client = Client::builder().timeout(config.request_timeout).build()?;
    let notifier = match config.notify_webhook_url.as_ref() {
        Some(url) => Notifier::Webhook(WebhookNotifier::new(client, url.clone())),
        None => Notifier::Noop,
    };
    let comments = CommentService::new(
        PgCommentStore::new(pool.clone()),
        PgPostDirectory::new(pool.clone()),
        PgCommentCounter::new(pool.clone()),
        notifier,
        config.notify_timeout,
    );
    Ok(AppState {
        config: Arc::new(config),
        db: pool,
        comments: Arc::new(comments),
    })
}
