use std::sync::Arc;

use crate::error::{UserError, UserResult};
use crate::models::{RegistrationRequest, UpdateRequest, User, UserId, UserView};
use crate::repository::UserStore;
use crate::validation::ensure_valid;

const MISSING_ID: &str = "User id must be provided";

/// Business rules of the user lifecycle.
///
/// Holds no state of its own; every check is read-then-write against the
/// store, which provides the final uniqueness guarantee.
#[derive(Clone)]
pub struct UserLifecycleService<S: UserStore> {
    store: Arc<S>,
}

impl<S: UserStore> UserLifecycleService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// All active users, ordered by the store
    pub async fn get_all_users(&self) -> UserResult<Vec<UserView>> {
        let users = self.store.find_active().await?;
        Ok(users.into_iter().map(UserView::from).collect())
    }

    /// Active user by id; absence is not an error here
    pub async fn get_user(&self, id: UserId) -> UserResult<Option<UserView>> {
        let user = self.store.find_active_by_id(id).await?;
        Ok(user.map(UserView::from))
    }

    /// Active users for every id in `ids`, or `NotFound` with the missing count.
    pub async fn get_users(&self, ids: &[UserId]) -> UserResult<Vec<UserView>> {
        if ids.is_empty() {
            return Err(UserError::invalid("At least one id should be provided"));
        }

        let users = self.store.find_active_by_ids(ids).await?;
        if users.len() < ids.len() {
            return Err(UserError::not_found(ids.len() - users.len()));
        }

        Ok(users.into_iter().map(UserView::from).collect())
    }

    /// Registers a new active user.
    ///
    /// Fails with `DuplicateEmail` when an active user already owns the email,
    /// ignoring case. Archived users do not block re-registration.
    pub async fn add_user(&self, request: RegistrationRequest) -> UserResult<UserView> {
        ensure_valid(&request)?;

        if self
            .store
            .find_active_by_email(&request.email)
            .await?
            .is_some()
        {
            tracing::info!(email = %request.email, "Registration rejected, email already in use");
            return Err(UserError::DuplicateEmail);
        }

        let saved = self
            .store
            .save(User::new(request.name, request.email))
            .await?;

        tracing::info!(user_id = ?saved.id, "Registered user");
        Ok(UserView::from(saved))
    }

    /// Renames a user, archived or not. Email and archived flag are untouched.
    pub async fn update_user(&self, request: UpdateRequest) -> UserResult<()> {
        ensure_valid(&request)?;
        let id = request.id.ok_or_else(|| UserError::invalid(MISSING_ID))?;

        let mut user = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| UserError::not_found(1))?;

        user.rename(request.name);
        self.store.save(user).await?;

        tracing::info!(user_id = id, "Updated user");
        Ok(())
    }

    /// Renames a batch of users in one store call.
    ///
    /// Nothing is persisted when any requested id is missing. When ids repeat,
    /// the first request for an id wins.
    pub async fn update_users(&self, requests: Vec<UpdateRequest>) -> UserResult<()> {
        if requests.is_empty() {
            return Err(UserError::invalid("At least one user must be provided"));
        }

        let mut ids = Vec::with_capacity(requests.len());
        for request in &requests {
            ensure_valid(request)?;
            ids.push(request.id.ok_or_else(|| UserError::invalid(MISSING_ID))?);
        }

        let mut users = self.store.find_all_by_ids(&ids).await?;
        if users.len() < requests.len() {
            return Err(UserError::not_found(requests.len() - users.len()));
        }

        for user in &mut users {
            if let Some(request) = requests.iter().find(|r| r.id == user.id) {
                user.rename(request.name.clone());
            }
        }

        let saved = self.store.save_all(users).await?;
        tracing::info!(count = saved.len(), "Updated users");
        Ok(())
    }

    /// Archives a user. Archiving an already archived user succeeds.
    pub async fn soft_delete_user(&self, id: Option<UserId>) -> UserResult<()> {
        let id = id.ok_or_else(|| UserError::invalid(MISSING_ID))?;

        let mut user = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| UserError::not_found(1))?;

        user.archive();
        self.store.save(user).await?;

        tracing::info!(user_id = id, "Archived user");
        Ok(())
    }

    /// Archives every user in `ids` in one store call, or none of them.
    pub async fn soft_delete_users(&self, ids: &[UserId]) -> UserResult<()> {
        if ids.is_empty() {
            return Err(UserError::invalid("At least one user id must be provided"));
        }

        let mut users = self.store.find_all_by_ids(ids).await?;
        if users.len() < ids.len() {
            return Err(UserError::not_found(ids.len() - users.len()));
        }

        users.iter_mut().for_each(User::archive);

        let saved = self.store.save_all(users).await?;
        tracing::info!(count = saved.len(), "Archived users");
        Ok(())
    }
}
