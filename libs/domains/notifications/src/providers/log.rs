use super::EmailProvider;
use crate::error::NotificationResult;
use crate::models::NotificationRequest;
use async_trait::async_trait;

/// Provider that only logs outgoing emails; for environments without SMTP.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProvider;

#[async_trait]
impl EmailProvider for LogProvider {
    async fn send(&self, email: &NotificationRequest) -> NotificationResult<()> {
        tracing::info!(
            from = %email.from,
            to = %email.to,
            subject = %email.subject,
            "Email delivery skipped, logging only"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
