use crate::audit::{AuditEvent, AuditOutcome};
use crate::errors::AppError;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Basic};
use constant_time_eq::constant_time_eq;
use core_config::{ConfigError, FromEnv, env_required};
use std::sync::Arc;

/// Single credential pair accepted by [`basic_auth_middleware`].
///
/// Loaded from environment variables:
/// - `BASIC_AUTH_USERNAME` (required)
/// - `BASIC_AUTH_PASSWORD` (required)
#[derive(Clone)]
pub struct BasicAuthConfig {
    pub username: String,
    pub password: String,
    pub realm: String,
}

impl BasicAuthConfig {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            realm: "registry".to_string(),
        }
    }

    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    /// The `Authorization` header value a client must send.
    pub fn header_value(&self) -> String {
        let mut headers = HeaderMap::new();
        headers.typed_insert(Authorization::basic(&self.username, &self.password));
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .unwrap_or_default()
    }

    /// Compares both fields in constant time; neither comparison short-circuits.
    fn accepts(&self, credentials: &Basic) -> bool {
        let username =
            constant_time_eq(credentials.username().as_bytes(), self.username.as_bytes());
        let password =
            constant_time_eq(credentials.password().as_bytes(), self.password.as_bytes());
        username & password
    }
}

impl std::fmt::Debug for BasicAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuthConfig")
            .field("username", &self.username)
            .field("password", &"***")
            .field("realm", &self.realm)
            .finish()
    }
}

impl FromEnv for BasicAuthConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let username = env_required("BASIC_AUTH_USERNAME")?;
        let password = env_required("BASIC_AUTH_PASSWORD")?;
        Ok(Self::new(username, password))
    }
}

/// Rejects requests without a matching `Authorization: Basic` header.
///
/// ```ignore
/// let auth = Arc::new(BasicAuthConfig::from_env()?);
/// let api = Router::new()
///     .nest("/v1/users", users)
///     .layer(axum::middleware::from_fn_with_state(auth, basic_auth_middleware));
/// ```
pub async fn basic_auth_middleware(
    State(config): State<Arc<BasicAuthConfig>>,
    request: Request,
    next: Next,
) -> Response {
    match request.headers().typed_get::<Authorization<Basic>>() {
        Some(Authorization(credentials)) if config.accepts(&credentials) => next.run(request).await,
        Some(Authorization(credentials)) => {
            tracing::warn!(username = %credentials.username(), "Rejected basic auth credentials");
            AuditEvent::new("auth.basic", AuditOutcome::Denied)
                .with_resource(request.uri().path())
                .from_request(request.headers())
                .log();
            unauthorized(&config.realm)
        }
        None => {
            tracing::debug!("No basic auth credentials provided");
            unauthorized(&config.realm)
        }
    }
}

fn unauthorized(realm: &str) -> Response {
    let mut response = AppError::Unauthorized("Authentication required".to_string()).into_response();
    if let Ok(challenge) = HeaderValue::from_str(&format!("Basic realm=\"{}\"", realm)) {
        response
            .headers_mut()
            .insert(header::WWW_AUTHENTICATE, challenge);
    }
    response
}
