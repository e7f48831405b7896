//! Error types for the notifications domain.

use thiserror::Error;

/// Result type for notification operations.
pub type NotificationResult<T> = Result<T, NotificationError>;

#[derive(Debug, Error)]
pub enum NotificationError {
    /// The mail service could not be reached.
    #[error("Mail service unreachable: {0}")]
    Transport(String),

    /// The mail service answered with a non-success status.
    #[error("Mail service rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Email provider error.
    #[error("Email provider error: {0}")]
    ProviderError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<reqwest::Error> for NotificationError {
    fn from(err: reqwest::Error) -> Self {
        NotificationError::Transport(err.to_string())
    }
}

impl From<core_config::ConfigError> for NotificationError {
    fn from(err: core_config::ConfigError) -> Self {
        NotificationError::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_is_wrapped() {
        let err = NotificationError::from(core_config::ConfigError::MissingEnvVar("EMAIL_FROM".into()));
        assert!(matches!(err, NotificationError::ConfigError(ref msg) if msg.contains("EMAIL_FROM")));
        assert!(err.to_string().starts_with("Configuration error:"));
    }

    #[test]
    fn test_rejected_reports_status_and_body() {
        let err = NotificationError::Rejected { status: 401, body: "Unauthorized".into() };
        assert_eq!(
            err.to_string(),
            "Mail service rejected request with status 401: Unauthorized"
        );
    }
}
