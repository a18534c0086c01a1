use async_trait::async_trait;

use crate::domain::models::Notification;
use crate::domain::ports::{Notifier, NotifyError};

/// Notifier that only records the message in the log.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            school_id = %notification.school_id,
            recipient = %notification.recipient,
            round = notification.round_number,
            subject = %notification.subject(),
            "notification"
        );
        Ok(())
    }
}
