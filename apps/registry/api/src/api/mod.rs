use axum::{Router, middleware, routing::get};
use axum_helpers::basic_auth_middleware;
use domain_notifications::WelcomeDispatcher;
use domain_users::{InMemoryUserStore, PgUserStore, UserLifecycleService, handlers};
use std::sync::Arc;

use crate::state::AppState;

pub mod health;

/// API routes without the `/api` prefix, which `create_router` adds.
///
/// Every route sits behind basic auth. Users are stored in PostgreSQL when a
/// connection is configured, in memory otherwise.
pub fn routes(state: &AppState, notifier: Option<WelcomeDispatcher>) -> Router {
    let users = match &state.db {
        Some(db) => handlers::router(UserLifecycleService::new(PgUserStore::new(db.clone())), notifier),
        None => handlers::router(UserLifecycleService::new(InMemoryUserStore::new()), notifier),
    };

    Router::new()
        .nest("/v1/users", users)
        .layer(middleware::from_fn_with_state(
            Arc::new(state.config.auth.clone()),
            basic_auth_middleware,
        ))
}

/// `/ready` with a database ping when PostgreSQL is configured.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Environment};
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum_helpers::BasicAuthConfig;
    use core_config::{app_info, server::ServerConfig};
    use domain_notifications::NotificationConfig;
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tower::ServiceExt;

    fn state() -> AppState {
        AppState {
            config: Config {
                app: app_info!(),
                server: ServerConfig::default(),
                environment: Environment::Development,
                database: None,
                auth: BasicAuthConfig::new("admin", "secret"),
                notifications: NotificationConfig {
                    email_from: "registry@demo.com".into(),
                    service_url: "http://localhost:8081".into(),
                    auth_header: "Basic x".into(),
                    timeout: Duration::from_secs(1),
                },
            },
            db: None,
        }
    }

    fn register(authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/v1/users/register")
            .header("content-type", "application/json");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder
            .body(Body::from(r#"{"full-name":"Alex","email":"alex@demo.com"}"#))
            .unwrap()
    }

    #[tokio::test]
    async fn test_users_require_basic_auth() {
        let response = routes(&state(), None).oneshot(register(None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejected() {
        let wrong = BasicAuthConfig::new("admin", "guess").header_value();
        let response = routes(&state(), None)
            .oneshot(register(Some(&wrong)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_authenticated_registration() {
        let state = state();
        let credentials = state.config.auth.header_value();
        let response = routes(&state, None)
            .oneshot(register(Some(&credentials)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/api/v1/users/1"
        );
    }

    #[tokio::test]
    async fn test_ready_without_database() {
        let response = ready_router(state())
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ready");
    }
}
