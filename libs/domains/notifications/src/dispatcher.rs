use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::client::MailClient;
use crate::messages::{MessageSource, WELCOME_MESSAGE, WELCOME_SUBJECT};
use crate::models::NotificationRequest;

/// Sends welcome notifications without blocking the caller.
///
/// Each dispatch runs on its own tokio task. The outcome is only logged;
/// a failed send never reaches the code that triggered it.
#[derive(Clone)]
pub struct WelcomeDispatcher {
    client: Arc<dyn MailClient>,
    messages: Arc<dyn MessageSource>,
    from: String,
}

impl WelcomeDispatcher {
    pub fn new(
        client: Arc<dyn MailClient>,
        messages: Arc<dyn MessageSource>,
        from: impl Into<String>,
    ) -> Self {
        Self {
            client,
            messages,
            from: from.into(),
        }
    }

    /// Builds the localized welcome email for a new user.
    pub fn compose_welcome(&self, name: &str, email: &str, locale: &str) -> NotificationRequest {
        NotificationRequest::new(
            self.from.clone(),
            email,
            self.messages.message(WELCOME_SUBJECT, &[], locale),
            self.messages.message(WELCOME_MESSAGE, &[name, email], locale),
        )
    }

    /// Sends the welcome email on a background task.
    ///
    /// The returned handle may be dropped; awaiting it only waits for the
    /// attempt to finish and never yields the send error.
    pub fn dispatch_welcome(&self, name: &str, email: &str, locale: &str) -> JoinHandle<()> {
        let request = self.compose_welcome(name, email, locale);
        let client = Arc::clone(&self.client);

        tokio::spawn(async move {
            match client.send(&request).await {
                Ok(()) => {
                    tracing::info!("Welcome email was sent to email address {}", request.to)
                }
                Err(err) => tracing::error!(
                    error = %err,
                    "Welcome email could not be sent to email address {}",
                    request.to
                ),
            }
        })
    }
}

impl std::fmt::Debug for WelcomeDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WelcomeDispatcher")
            .field("from", &self.from)
            .finish_non_exhaustive()
    }
}
