use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserId};

/// Persistence operations required by the user lifecycle.
///
/// "Active" means not archived. Lookups without that qualifier see archived
/// users too. Implementations own transaction boundaries: `save_all` must
/// persist the whole batch or nothing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// All active users, ordered by id
    async fn find_active(&self) -> UserResult<Vec<User>>;

    /// Active users whose id is in `ids`
    async fn find_active_by_ids(&self, ids: &[UserId]) -> UserResult<Vec<User>>;

    async fn find_active_by_id(&self, id: UserId) -> UserResult<Option<User>>;

    /// Active user whose email matches ignoring case
    async fn find_active_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// User by id, archived or not
    async fn find_by_id(&self, id: UserId) -> UserResult<Option<User>>;

    /// Users whose id is in `ids`, archived or not
    async fn find_all_by_ids(&self, ids: &[UserId]) -> UserResult<Vec<User>>;

    /// Inserts when `user.id` is `None`, otherwise updates; returns the stored row.
    async fn save(&self, user: User) -> UserResult<User>;

    /// Persists every user in one atomic batch.
    async fn save_all(&self, users: Vec<User>) -> UserResult<Vec<User>>;
}

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<UserId, User>,
    last_id: UserId,
}

impl Table {
    /// Active-email uniqueness, mirroring the partial unique index in PostgreSQL.
    fn check_unique_email(&self, user: &User) -> UserResult<()> {
        if user.archived {
            return Ok(());
        }

        let clash = self
            .rows
            .values()
            .any(|other| other.is_active() && other.id != user.id && other.has_email(&user.email));

        if clash {
            return Err(UserError::DuplicateEmail);
        }
        Ok(())
    }

    fn put(&mut self, mut user: User) -> User {
        let id = match user.id {
            Some(id) => id,
            None => {
                self.last_id += 1;
                self.last_id
            }
        };
        self.last_id = self.last_id.max(id);
        user.id = Some(id);
        self.rows.insert(id, user.clone());
        user
    }
}

/// In-memory store for development and tests.
///
/// Ids are assigned sequentially from 1.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserStore {
    table: Arc<RwLock<Table>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_active(&self) -> UserResult<Vec<User>> {
        let table = self.table.read().await;
        Ok(table.rows.values().filter(|u| u.is_active()).cloned().collect())
    }

    async fn find_active_by_ids(&self, ids: &[UserId]) -> UserResult<Vec<User>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|u| u.is_active() && u.id.is_some_and(|id| ids.contains(&id)))
            .cloned()
            .collect())
    }

    async fn find_active_by_id(&self, id: UserId) -> UserResult<Option<User>> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).filter(|u| u.is_active()).cloned())
    }

    async fn find_active_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .find(|u| u.is_active() && u.has_email(email))
            .cloned())
    }

    async fn find_by_id(&self, id: UserId) -> UserResult<Option<User>> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).cloned())
    }

    async fn find_all_by_ids(&self, ids: &[UserId]) -> UserResult<Vec<User>> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .filter(|u| u.id.is_some_and(|id| ids.contains(&id)))
            .cloned()
            .collect())
    }

    async fn save(&self, user: User) -> UserResult<User> {
        let mut table = self.table.write().await;
        table.check_unique_email(&user)?;

        let saved = table.put(user);
        tracing::debug!(user_id = ?saved.id, archived = saved.archived, "Saved user");
        Ok(saved)
    }

    async fn save_all(&self, users: Vec<User>) -> UserResult<Vec<User>> {
        let mut table = self.table.write().await;
        for user in &users {
            table.check_unique_email(user)?;
        }

        let saved: Vec<User> = users.into_iter().map(|user| table.put(user)).collect();
        tracing::debug!(count = saved.len(), "Saved user batch");
        Ok(saved)
    }
}
