use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserError {
    /// Required input is missing, empty or fails a field rule
    #[error("{0}")]
    InvalidInput(String),

    /// `missing` requested users do not exist among eligible records
    #[error("{}", not_found_message(.missing))]
    NotFound { missing: usize },

    #[error("User with provided email already exists")]
    DuplicateEmail,

    #[error("Internal error: {0}")]
    Internal(String),
}

fn not_found_message(missing: &usize) -> String {
    if *missing == 1 {
        "User was not found".to_string()
    } else {
        format!("{} users were not found", missing)
    }
}

impl UserError {
    pub fn invalid(message: impl Into<String>) -> Self {
        UserError::InvalidInput(message.into())
    }

    pub fn not_found(missing: usize) -> Self {
        UserError::NotFound { missing }
    }

    pub(crate) fn database(err: impl std::fmt::Display) -> Self {
        UserError::Internal(format!("Database error: {}", err))
    }
}

pub type UserResult<T> = Result<T, UserError>;

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::InvalidInput(msg) => AppError::BadRequest(msg),
            err @ UserError::NotFound { .. } => AppError::NotFound(err.to_string()),
            err @ UserError::DuplicateEmail => AppError::Conflict(err.to_string()),
            UserError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
