//! Email delivery backends used by the mail service.

mod log;
mod mock;
mod smtp;

pub use log::LogProvider;
pub use mock::MockEmailProvider;
pub use smtp::{SmtpConfig, SmtpProvider};

use crate::error::NotificationResult;
use crate::models::NotificationRequest;
use async_trait::async_trait;
use core_config::{ConfigError, env_or_default};
use std::sync::Arc;

/// Delivers a plain-text email.
#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(&self, email: &NotificationRequest) -> NotificationResult<()>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

/// Selects the provider named by `MAIL_PROVIDER` (`smtp` default, or `log`).
pub fn provider_from_env() -> NotificationResult<Arc<dyn EmailProvider>> {
    let provider: Arc<dyn EmailProvider> = match env_or_default("MAIL_PROVIDER", "smtp").as_str() {
        "smtp" => Arc::new(SmtpProvider::from_env()?),
        "log" => Arc::new(LogProvider),
        other => {
            return Err(ConfigError::ParseError {
                key: "MAIL_PROVIDER".to_string(),
                details: format!("unknown provider '{}', expected smtp or log", other),
            }
            .into());
        }
    };

    tracing::info!(provider = provider.name(), "Email provider selected");
    Ok(provider)
}
