//! # Axum Helpers
//!
//! Shared building blocks for the registry HTTP services.
//!
//! - **[`server`]**: router assembly with Swagger UI, health endpoints, graceful shutdown
//! - **[`http`]**: CORS and security headers
//! - **[`auth`]**: HTTP basic authentication middleware
//! - **[`errors`]**: `AppError` and the standard JSON error body
//! - **[`extractors`]**: `ValidatedJson` and `IdPath`
//! - **[`audit`]**: audit events on the `audit` tracing target
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router, health_router};
//!
//! let router = create_router::<ApiDoc>(api_routes).await?;
//! let app = router.merge(health_router(core_config::app_info!()));
//! create_production_app(app, &config.server, Duration::from_secs(30), async {}).await?;
//! ```

pub mod audit;
pub mod auth;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use auth::{BasicAuthConfig, basic_auth_middleware};

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks,
};

pub use http::{cors_layer_from_env, create_cors_layer, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{IdPath, ValidatedJson};

pub use audit::{AuditEvent, AuditOutcome, extract_ip_from_headers, extract_user_agent};
