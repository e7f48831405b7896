//! Mail Service
//!
//! Accepts plain-text emails over HTTP and delivers them in the background.
//!
//! ## Architecture
//!
//! ```text
//! POST /api/email/simple/send  (basic auth)
//!   ↓ validate, 202 Accepted
//! background task
//!   ↓
//! EmailProvider (SMTP / log)
//!   ↓
//! Email Delivery
//! ```
//!
//! Delivery failures are logged and dropped; the caller has already been
//! answered by then.

use axum::{Router, middleware};
use axum_helpers::{
    BasicAuthConfig, basic_auth_middleware,
    server::{create_production_app, health_router},
};
use core_config::{Environment, FromEnv, app_info, server::ServerConfig};
use domain_notifications::{EmailProvider, handlers, providers::provider_from_env};
use eyre::{Result, WrapErr};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use utoipa::OpenApi;

/// Listening port when `PORT` is unset; the API's default mail service URL points here.
pub const DEFAULT_PORT: u16 = 8081;

#[derive(OpenApi)]
#[openapi(
    info(title = "Mail Service API", description = "Plain-text email delivery"),
    nest((path = "/api/email", api = handlers::ApiDoc))
)]
pub struct ApiDoc;

/// API routes without the `/api` prefix, guarded by basic auth.
pub fn routes(provider: Arc<dyn EmailProvider>, auth: BasicAuthConfig) -> Router {
    Router::new()
        .nest("/email", handlers::router(provider))
        .layer(middleware::from_fn_with_state(
            Arc::new(auth.with_realm("mailer")),
            basic_auth_middleware,
        ))
}

/// Full application: docs, layers, API routes and `/health`.
pub async fn app(provider: Arc<dyn EmailProvider>, auth: BasicAuthConfig) -> io::Result<Router> {
    let router = axum_helpers::create_router::<ApiDoc>(routes(provider, auth)).await?;
    Ok(router.merge(health_router(app_info!())))
}

/// Run the mail service until SIGINT/SIGTERM.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the provider cannot be
/// built or the listener cannot bind.
pub async fn run() -> Result<()> {
    let environment = Environment::from_env();
    core_config::tracing::init_tracing(&environment);

    let app_info = app_info!();
    info!(name = %app_info.name, version = %app_info.version, "Starting mail service");

    let server = ServerConfig::from_env_with_port(DEFAULT_PORT)
        .wrap_err("Failed to load server configuration")?;
    let auth = BasicAuthConfig::from_env().wrap_err("Failed to load basic auth credentials")?;
    let provider = provider_from_env().wrap_err("Failed to configure email provider")?;

    let app = app(provider, auth).await?;

    create_production_app(app, &server, Duration::from_secs(10), async {
        info!("Mail service stopped accepting requests");
    })
    .await
    .wrap_err("Server error")?;

    info!("Mail service shutdown complete");
    Ok(())
}
