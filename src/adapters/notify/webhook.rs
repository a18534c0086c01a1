//! Webhook notifier: POSTs each notification as JSON.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::domain::models::Notification;
use crate::domain::ports::{Notifier, NotifyError};

#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| NotifyError::Rejected(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, url: url.into() })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.url)
            .json(notification)
            .send()
            .await
            .map_err(|e| NotifyError::Transient(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        // Throttling and server errors may clear up; other client errors will not
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            Err(NotifyError::Transient(format!("webhook returned {status}")))
        } else {
            Err(NotifyError::Rejected(format!("webhook returned {status}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{NotificationKind, Stage};
    use uuid::Uuid;

    fn notification() -> Notification {
        Notification {
            school_id: Uuid::new_v4(),
            school_name: "Fernhill".to_string(),
            recipient: "office@fernhill.example".to_string(),
            round_number: 1,
            kind: NotificationKind::StageCompleted { stage: Stage::Inspire },
        }
    }

    #[tokio::test]
    async fn test_posts_json_payload() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hooks/progress")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"kind":"stage_completed","stage":"inspire","round_number":1}"#.to_string(),
            ))
            .with_status(204)
            .create_async()
            .await;

        let notifier = WebhookNotifier::new(format!("{}/hooks/progress", server.url())).unwrap();
        notifier.send(&notification()).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_is_transient() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("POST", "/").with_status(503).create_async().await;

        let notifier = WebhookNotifier::new(server.url()).unwrap();
        let err = notifier.send(&notification()).await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_client_error_is_rejected() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("POST", "/").with_status(400).create_async().await;

        let notifier = WebhookNotifier::new(server.url()).unwrap();
        let err = notifier.send(&notification()).await.unwrap_err();
        assert!(!err.is_transient());
    }
}
