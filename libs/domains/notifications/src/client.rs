//! Client side of the mail service.

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_or_default, env_parse, env_required};
use reqwest::header::AUTHORIZATION;
use std::time::Duration;

use crate::error::{NotificationError, NotificationResult};
use crate::models::NotificationRequest;

/// Path of the plain-text send endpoint on the mail service
pub const SIMPLE_SEND_PATH: &str = "/api/email/simple/send";

/// Settings for reaching the mail service.
///
/// - `EMAIL_FROM` (required): sender address of outgoing notifications
/// - `EMAIL_SERVICE_URL` (default `http://localhost:8081`)
/// - `EMAIL_SERVICE_AUTH_HEADER` (required): sent verbatim as `Authorization`
/// - `NOTIFICATION_TIMEOUT_SECS` (default 10)
#[derive(Clone)]
pub struct NotificationConfig {
    pub email_from: String,
    pub service_url: String,
    pub auth_header: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for NotificationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationConfig")
            .field("email_from", &self.email_from)
            .field("service_url", &self.service_url)
            .field("auth_header", &"***")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl FromEnv for NotificationConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            email_from: env_required("EMAIL_FROM")?,
            service_url: env_or_default("EMAIL_SERVICE_URL", "http://localhost:8081"),
            auth_header: env_required("EMAIL_SERVICE_AUTH_HEADER")?,
            timeout: Duration::from_secs(env_parse("NOTIFICATION_TIMEOUT_SECS", "10")?),
        })
    }
}

/// Sends a notification to the mail service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailClient: Send + Sync {
    async fn send(&self, request: &NotificationRequest) -> NotificationResult<()>;
}

/// [`MailClient`] that posts JSON to the mail service over HTTP.
#[derive(Debug, Clone)]
pub struct HttpMailClient {
    http: reqwest::Client,
    endpoint: String,
    auth_header: String,
}

impl HttpMailClient {
    pub fn new(config: &NotificationConfig) -> NotificationResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NotificationError::ConfigError(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: format!(
                "{}{}",
                config.service_url.trim_end_matches('/'),
                SIMPLE_SEND_PATH
            ),
            auth_header: config.auth_header.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl MailClient for HttpMailClient {
    async fn send(&self, request: &NotificationRequest) -> NotificationResult<()> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(AUTHORIZATION, &self.auth_header)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(to = %request.to, status = status.as_u16(), "Mail service accepted notification");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(url: Option<&'static str>) -> Vec<(&'static str, Option<&'static str>)> {
        vec![
            ("EMAIL_FROM", Some("registry@demo.com")),
            ("EMAIL_SERVICE_URL", url),
            ("EMAIL_SERVICE_AUTH_HEADER", Some("Basic dXNlcjpwYXNz")),
            ("NOTIFICATION_TIMEOUT_SECS", None),
        ]
    }

    #[test]
    fn test_config_defaults() {
        temp_env::with_vars(vars(None), || {
            let config = NotificationConfig::from_env().unwrap();
            assert_eq!(config.service_url, "http://localhost:8081");
            assert_eq!(config.timeout, Duration::from_secs(10));
        });
    }

    #[test]
    fn test_config_requires_auth_header() {
        temp_env::with_vars(
            [
                ("EMAIL_FROM", Some("registry@demo.com")),
                ("EMAIL_SERVICE_AUTH_HEADER", None),
            ],
            || {
                assert!(NotificationConfig::from_env().is_err());
            },
        );
    }

    #[test]
    fn test_debug_hides_auth_header() {
        temp_env::with_vars(vars(None), || {
            let config = NotificationConfig::from_env().unwrap();
            let printed = format!("{:?}", config);
            assert!(!printed.contains("dXNlcjpwYXNz"));
        });
    }

    #[test]
    fn test_endpoint_joins_path() {
        temp_env::with_vars(vars(Some("http://mailer:8081/")), || {
            let config = NotificationConfig::from_env().unwrap();
            let client = HttpMailClient::new(&config).unwrap();
            assert_eq!(client.endpoint(), "http://mailer:8081/api/email/simple/send");
        });
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        let config = NotificationConfig {
            email_from: "registry@demo.com".into(),
            service_url: "http://127.0.0.1:9".into(),
            auth_header: "Basic x".into(),
            timeout: Duration::from_secs(1),
        };
        let client = HttpMailClient::new(&config).unwrap();
        let request = NotificationRequest::new("registry@demo.com", "alex@demo.com", "Hi", "Hello");

        let err = client.send(&request).await.unwrap_err();
        assert!(matches!(err, NotificationError::Transport(_)));
    }
}
