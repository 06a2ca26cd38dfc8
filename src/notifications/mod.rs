use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::api::ApiFailure;
use crate::i18n::{self, Messages};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }

    fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            created_at: Utc::now(),
        }
    }
}

/// Where user-facing messages go.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<()>;
}

/// Deliver a batch; a failing notifier is logged and never fails the caller.
pub async fn deliver(notifier: &dyn Notifier, notifications: Vec<Notification>) {
    for notification in notifications {
        if let Err(e) = notifier.notify(notification).await {
            tracing::warn!(error = %e, "failed to deliver notification");
        }
    }
}

/// One notification per structured field error, otherwise a single
/// notification carrying the failure message.
pub fn render_failure(messages: &Messages, failure: &ApiFailure) -> Vec<Notification> {
    if failure.field_errors.is_empty() {
        return vec![Notification::error(
            messages.t(i18n::MSG_API_ERROR, &[failure.message.as_str()]),
        )];
    }
    failure
        .field_errors
        .iter()
        .map(|err| {
            Notification::error(messages.t(
                i18n::MSG_API_ERRORS,
                &[err.field.as_str(), err.message.as_str()],
            ))
        })
        .collect()
}

/// Forwards notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notification: Notification) -> Result<()> {
        match notification.level {
            NotificationLevel::Success => {
                tracing::info!(message = %notification.message, "notification")
            }
            NotificationLevel::Error => {
                tracing::warn!(message = %notification.message, "notification")
            }
        }
        Ok(())
    }
}

/// Keeps notifications in memory until drained.
#[derive(Debug, Default, Clone)]
pub struct MemoryNotifier {
    inbox: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.inbox.lock().await)
    }

    pub async fn len(&self) -> usize {
        self.inbox.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inbox.lock().await.is_empty()
    }
}

#[async_trait::async_trait]
impl Notifier for MemoryNotifier {
    async fn notify(&self, notification: Notification) -> Result<()> {
        self.inbox.lock().await.push(notification);
        Ok(())
    }
}
