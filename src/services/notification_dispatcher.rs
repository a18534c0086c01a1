//! Fire-and-forget notification dispatch with exponential backoff.
//!
//! Delivery runs on its own task. Failures are logged and dropped; they never
//! reach the progression write that triggered them.

use std::sync::Arc;
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::models::{Notification, RetryConfig};
use crate::domain::ports::{Notifier, NotifyError};

#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
    retry: RetryConfig,
}

impl NotificationDispatcher {
    pub fn new(notifier: Arc<dyn Notifier>, retry: RetryConfig) -> Self {
        Self { notifier, retry }
    }

    /// Spawn delivery and return immediately.
    ///
    /// The handle is only useful to tests; production callers drop it.
    pub fn dispatch(&self, notification: Notification) -> JoinHandle<()> {
        let notifier = self.notifier.clone();
        let retry = self.retry.clone();

        tokio::spawn(async move {
            if let Err(e) = deliver(notifier.as_ref(), &notification, &retry).await {
                warn!(
                    school_id = %notification.school_id,
                    recipient = %notification.recipient,
                    error = %e,
                    "notification dropped"
                );
            }
        })
    }
}

async fn deliver(
    notifier: &dyn Notifier,
    notification: &Notification,
    retry: &RetryConfig,
) -> Result<(), NotifyError> {
    let policy = ExponentialBackoffBuilder::new()
        .with_initial_interval(Duration::from_millis(retry.initial_backoff_ms))
        .with_max_interval(Duration::from_millis(retry.max_backoff_ms))
        .with_max_elapsed_time(None)
        .build();

    let mut attempt = 0u32;
    backoff::future::retry(policy, || {
        attempt += 1;
        let this_attempt = attempt;
        async move {
            match notifier.send(notification).await {
                Ok(()) => Ok(()),
                Err(e) if e.is_transient() && this_attempt <= retry.max_retries => {
                    debug!(attempt = this_attempt, error = %e, "notification delivery failed, retrying");
                    Err(backoff::Error::transient(e))
                }
                Err(e) => Err(backoff::Error::permanent(e)),
            }
        }
    })
    .await
}
