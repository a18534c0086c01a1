//! Notification delivery port.

use async_trait::async_trait;

use crate::domain::models::Notification;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Network or server-side failure; delivery may succeed later
    #[error("Delivery failed: {0}")]
    Transient(String),

    /// The receiver refused the message; retrying will not help
    #[error("Delivery rejected: {0}")]
    Rejected(String),
}

impl NotifyError {
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Delivers a single notification. Callers treat failures as non-fatal.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}
