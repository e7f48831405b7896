use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
    routing::{get, patch, post},
};
use axum_helpers::{
    AppError, AuditEvent, AuditOutcome, IdPath, ValidatedJson,
    errors::responses::{
        BadRequestIdResponse, BadRequestResponse, BadRequestValidationResponse, ConflictResponse,
        InternalServerErrorResponse, NotFoundResponse, UnauthorizedResponse,
    },
};
use domain_notifications::{WelcomeDispatcher, preferred_locale};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::models::{RegistrationRequest, UpdateRequest, UserId, UserView};
use crate::repository::UserStore;
use crate::service::UserLifecycleService;

/// Public mount point of the user routes; used for `Location` headers
pub const USERS_PATH: &str = "/api/v1/users";

pub const TAG: &str = "users";

/// OpenAPI documentation for the user registry
#[derive(OpenApi)]
#[openapi(
    paths(
        list_users,
        get_user,
        get_users,
        register_user,
        update_user,
        update_users,
        delete_user,
        delete_users,
    ),
    components(
        schemas(UserView, RegistrationRequest, UpdateRequest),
        responses(
            BadRequestResponse,
            BadRequestValidationResponse,
            BadRequestIdResponse,
            NotFoundResponse,
            ConflictResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "User registration and lifecycle")
    )
)]
pub struct ApiDoc;

/// Service plus the optional welcome notifier shared by all user handlers.
pub struct UsersState<S: UserStore> {
    service: UserLifecycleService<S>,
    notifier: Option<WelcomeDispatcher>,
}

/// Create the user router with all HTTP endpoints.
///
/// Without a notifier, registration succeeds without sending a welcome email.
pub fn router<S: UserStore + 'static>(
    service: UserLifecycleService<S>,
    notifier: Option<WelcomeDispatcher>,
) -> Router {
    let state = Arc::new(UsersState { service, notifier });

    Router::new()
        .route("/", get(list_users).post(get_users).delete(delete_users))
        .route("/{id}", get(get_user).delete(delete_user))
        .route("/register", post(register_user))
        .route("/update/single", patch(update_user))
        .route("/update/multiple", patch(update_users))
        .with_state(state)
}

/// List all active users
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    responses(
        (status = 200, description = "Active users", body = Vec<UserView>),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_users<S: UserStore>(
    State(state): State<Arc<UsersState<S>>>,
) -> Result<Json<Vec<UserView>>, AppError> {
    let users = state.service.get_all_users().await?;
    Ok(Json(users))
}

/// Get an active user by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "User found", body = UserView),
        (status = 400, response = BadRequestIdResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user<S: UserStore>(
    State(state): State<Arc<UsersState<S>>>,
    IdPath(id): IdPath,
) -> Result<Json<UserView>, AppError> {
    let user = state
        .service
        .get_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User not found with id:{}", id)))?;

    Ok(Json(user))
}

/// Get several active users by id
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body(content = Vec<i64>, description = "User ids", example = json!([1, 2])),
    responses(
        (status = 200, description = "All requested users", body = Vec<UserView>),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_users<S: UserStore>(
    State(state): State<Arc<UsersState<S>>>,
    payload: Result<Json<Vec<UserId>>, JsonRejection>,
) -> Result<Json<Vec<UserView>>, AppError> {
    let Json(ids) = payload?;
    let users = state.service.get_users(&ids).await?;
    Ok(Json(users))
}

/// Register a new user and send a welcome email
#[utoipa::path(
    post,
    path = "/register",
    tag = TAG,
    request_body = RegistrationRequest,
    responses(
        (status = 201, description = "User registered", body = UserView,
            headers(("Location" = String, description = "URL of the new user"))),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn register_user<S: UserStore>(
    State(state): State<Arc<UsersState<S>>>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<RegistrationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = match state.service.add_user(request).await {
        Ok(user) => user,
        Err(err) => {
            AuditEvent::new("user.register", AuditOutcome::Failure)
                .with_details(serde_json::json!({ "reason": err.to_string() }))
                .from_request(&headers)
                .log();
            return Err(err.into());
        }
    };
    let id = user.id.ok_or_else(|| {
        AppError::InternalServerError("Registered user has no id".to_string())
    })?;

    AuditEvent::new("user.register", AuditOutcome::Success)
        .with_resource(format!("user:{}", id))
        .from_request(&headers)
        .log();

    if let Some(notifier) = &state.notifier {
        let accept_language = headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok());
        notifier.dispatch_welcome(&user.name, &user.email, &preferred_locale(accept_language));
    }

    let location = format!("{}/{}", USERS_PATH, id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(user)))
}

/// Rename a single user
#[utoipa::path(
    patch,
    path = "/update/single",
    tag = TAG,
    request_body = UpdateRequest,
    responses(
        (status = 204, description = "User updated"),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_user<S: UserStore>(
    State(state): State<Arc<UsersState<S>>>,
    ValidatedJson(request): ValidatedJson<UpdateRequest>,
) -> Result<StatusCode, AppError> {
    state.service.update_user(request).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Rename several users at once
#[utoipa::path(
    patch,
    path = "/update/multiple",
    tag = TAG,
    request_body = Vec<UpdateRequest>,
    responses(
        (status = 204, description = "Users updated"),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_users<S: UserStore>(
    State(state): State<Arc<UsersState<S>>>,
    payload: Result<Json<Vec<UpdateRequest>>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(requests) = payload?;
    state.service.update_users(requests).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Archive a user
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "User id")
    ),
    responses(
        (status = 204, description = "User archived"),
        (status = 400, response = BadRequestIdResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_user<S: UserStore>(
    State(state): State<Arc<UsersState<S>>>,
    headers: HeaderMap,
    IdPath(id): IdPath,
) -> Result<StatusCode, AppError> {
    state.service.soft_delete_user(Some(id)).await?;

    AuditEvent::new("user.archive", AuditOutcome::Success)
        .with_resource(format!("user:{}", id))
        .from_request(&headers)
        .log();

    Ok(StatusCode::NO_CONTENT)
}

/// Archive several users at once
#[utoipa::path(
    delete,
    path = "",
    tag = TAG,
    request_body(content = Vec<i64>, description = "User ids", example = json!([1, 2])),
    responses(
        (status = 204, description = "Users archived"),
        (status = 400, response = BadRequestResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_users<S: UserStore>(
    State(state): State<Arc<UsersState<S>>>,
    headers: HeaderMap,
    payload: Result<Json<Vec<UserId>>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let Json(ids) = payload?;
    state.service.soft_delete_users(&ids).await?;

    AuditEvent::new("user.archive", AuditOutcome::Success)
        .with_details(serde_json::json!({ "ids": ids }))
        .from_request(&headers)
        .log();

    Ok(StatusCode::NO_CONTENT)
}
