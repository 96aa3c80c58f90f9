use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use marginalia_core::domain::service::NotificationDispatcher;
use marginalia_core::error::DispatchFailure;

const USER_AGENT: &str = "marginalia";

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("webhook returned status {0}")]
    Status(u16),
}

#[derive(Debug, Serialize)]
struct NewCommentEvent {
    event: &'static str,
    owner_id: Uuid,
    comment_id: Uuid,
    post_id: Uuid,
    actor_id: Uuid,
}

/// Posts comment events to a configured webhook endpoint.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    http: reqwest::Client,
    endpoint: String,
}

impl WebhookNotifier {
    pub fn new(http: reqwest::Client, endpoint: String) -> Self {
        Self { http, endpoint }
    }

    async fn send(&self, event: &NewCommentEvent) -> Result<(), NotifyError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .json(event)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Status(status.as_u16()));
        }
        Ok(())
    }
}

/// The dispatcher wired into the comment service. Deployments without a
/// webhook endpoint run the no-op variant.
#[derive(Debug, Clone)]
pub enum Notifier {
    Webhook(WebhookNotifier),
    Noop,
}

impl NotificationDispatcher for Notifier {
    async fn notify_new_comment(
        &self,
        owner_id: Uuid,
        comment_id: Uuid,
        post_id: Uuid,
        actor_id: Uuid,
    ) -> Result<(), DispatchFailure> {
        match self {
            Notifier::Webhook(webhook) => {
                let event = NewCommentEvent {
                    event: "comment.created",
                    owner_id,
                    comment_id,
                    post_id,
                    actor_id,
                };
                webhook
                    .send(&event)
                    .await
                    .map_err(|err| DispatchFailure(err.to_string()))
            }
            Notifier::Noop => Ok(()),
        }
    }
}
