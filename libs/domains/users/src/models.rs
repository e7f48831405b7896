use crate::validation::{
    self, EMAIL_FIELD, ID_FIELD, NAME_FIELD, email_shape, id_present, not_blank,
    within_name_length,
};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

/// System-assigned user identifier
pub type UserId = i64;

/// Persisted user record.
///
/// `id` is `None` until the store assigns one on first save. Users are never
/// removed; soft deletion sets `archived`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Option<UserId>,
    pub name: String,
    pub email: String,
    pub archived: bool,
}

impl User {
    /// A new, active, not yet persisted user.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            archived: false,
        }
    }

    pub fn with_id(mut self, id: UserId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn is_active(&self) -> bool {
        !self.archived
    }

    /// Case-insensitive email comparison used for uniqueness.
    pub fn has_email(&self, email: &str) -> bool {
        self.email.to_lowercase() == email.to_lowercase()
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn archive(&mut self) {
        self.archived = true;
    }
}

/// Boundary projection of [`User`]; never exposes the archived flag.
///
/// Two views are equal when their ids are equal.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = 1)]
    pub id: Option<UserId>,
    #[serde(rename = "full-name")]
    #[schema(example = "Alex")]
    pub name: String,
    #[schema(example = "alex@demo.com")]
    pub email: String,
}

impl PartialEq for UserView {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for UserView {}

impl Hash for UserView {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

impl From<UserView> for User {
    fn from(view: UserView) -> Self {
        Self {
            id: view.id,
            name: view.name,
            email: view.email,
            archived: false,
        }
    }
}

/// Body of `POST /register`; the id is assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegistrationRequest {
    #[serde(rename = "full-name")]
    #[schema(example = "Alex")]
    pub name: String,
    #[schema(example = "alex@demo.com")]
    pub email: String,
}

impl RegistrationRequest {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl Validate for RegistrationRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validation::collect(
            &mut errors,
            NAME_FIELD,
            [not_blank(&self.name), within_name_length(&self.name)],
        );
        validation::collect(&mut errors, EMAIL_FIELD, [email_shape(&self.email)]);
        validation::into_result(errors)
    }
}

/// Name-only update of an existing user; email cannot change through this path.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateRequest {
    #[serde(default)]
    #[schema(example = 1)]
    pub id: Option<UserId>,
    #[serde(rename = "full-name")]
    #[schema(example = "Alex Smith")]
    pub name: String,
}

impl UpdateRequest {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
        }
    }
}

impl Validate for UpdateRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validation::collect(&mut errors, ID_FIELD, [id_present(&self.id)]);
        validation::collect(
            &mut errors,
            NAME_FIELD,
            [not_blank(&self.name), within_name_length(&self.name)],
        );
        validation::into_result(errors)
    }
}
