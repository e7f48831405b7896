//! HTTP surface of the mail service.

use axum::{Router, extract::State, http::StatusCode, routing::post};
use axum_helpers::{
    ValidatedJson,
    errors::responses::{
        BadRequestValidationResponse, InternalServerErrorResponse, UnauthorizedResponse,
    },
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use utoipa::OpenApi;

use crate::models::NotificationRequest;
use crate::providers::EmailProvider;

pub const TAG: &str = "email";

#[derive(OpenApi)]
#[openapi(
    paths(send_simple_email),
    components(
        schemas(NotificationRequest),
        responses(
            BadRequestValidationResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags((name = TAG, description = "Plain-text email delivery"))
)]
pub struct ApiDoc;

/// Routes for the mail service, to be nested under `/email`.
pub fn router(provider: Arc<dyn EmailProvider>) -> Router {
    Router::new()
        .route("/simple/send", post(send_simple_email))
        .with_state(provider)
}

/// Delivers `email` on a background task, logging the outcome.
pub fn deliver(provider: Arc<dyn EmailProvider>, email: NotificationRequest) -> JoinHandle<()> {
    tokio::spawn(async move {
        match provider.send(&email).await {
            Ok(()) => tracing::info!("Welcome email was sent to email address {}", email.to),
            Err(err) => tracing::error!(
                error = %err,
                provider = provider.name(),
                "Welcome email could not be sent to email address {}",
                email.to
            ),
        }
    })
}

/// Accept a plain-text email for delivery
#[utoipa::path(
    post,
    path = "/simple/send",
    tag = TAG,
    request_body = NotificationRequest,
    responses(
        (status = 202, description = "Email accepted for delivery"),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn send_simple_email(
    State(provider): State<Arc<dyn EmailProvider>>,
    ValidatedJson(email): ValidatedJson<NotificationRequest>,
) -> StatusCode {
    tracing::debug!(to = %email.to, "Email accepted for delivery");
    deliver(provider, email);
    StatusCode::ACCEPTED
}
