//! Recording provider for tests

use super::EmailProvider;
use crate::error::{NotificationError, NotificationResult};
use crate::models::NotificationRequest;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

/// Captures sent emails instead of delivering them.
#[derive(Clone, Default)]
pub struct MockEmailProvider {
    sent: Arc<Mutex<Vec<NotificationRequest>>>,
    delivered: Arc<Notify>,
    failure: Option<String>,
}

impl MockEmailProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose every send fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    pub async fn sent_emails(&self) -> Vec<NotificationRequest> {
        self.sent.lock().await.clone()
    }

    pub async fn was_sent_to(&self, email: &str) -> bool {
        self.sent.lock().await.iter().any(|e| e.to == email)
    }

    /// Waits until the next send attempt completes.
    pub async fn wait_for_delivery(&self) {
        self.delivered.notified().await;
    }
}

#[async_trait]
impl EmailProvider for MockEmailProvider {
    async fn send(&self, email: &NotificationRequest) -> NotificationResult<()> {
        let result = match &self.failure {
            Some(message) => Err(NotificationError::ProviderError(message.clone())),
            None => {
                self.sent.lock().await.push(email.clone());
                Ok(())
            }
        };
        self.delivered.notify_one();
        result
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
