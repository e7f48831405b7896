use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, RuntimeErr, SqlErr, TransactionTrait,
};

use crate::{
    entity,
    error::{UserError, UserResult},
    models::{User, UserId},
    repository::UserStore,
};

/// PostgreSQL-backed [`UserStore`].
///
/// Active-email uniqueness is enforced by the partial unique index
/// `ux_user_detail_active_email`; violations surface as
/// [`UserError::DuplicateEmail`].
pub struct PgUserStore {
    db: DatabaseConnection,
}

impl PgUserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// SQLSTATE `unique_violation`
const UNIQUE_VIOLATION: &str = "23505";

fn is_unique_violation(err: &DbErr) -> bool {
    if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
        return true;
    }

    match err {
        DbErr::Exec(RuntimeErr::SqlxError(e)) | DbErr::Query(RuntimeErr::SqlxError(e)) => {
            matches!(
                e.as_ref(),
                sea_orm::sqlx::Error::Database(db_err)
                    if db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
            )
        }
        _ => false,
    }
}

fn map_db_err(err: DbErr) -> UserError {
    if is_unique_violation(&err) {
        UserError::DuplicateEmail
    } else {
        UserError::database(err)
    }
}

async fn persist<C: ConnectionTrait>(conn: &C, user: User) -> UserResult<User> {
    let is_new = user.id.is_none();
    let active_model: entity::ActiveModel = user.into();

    let model = if is_new {
        active_model.insert(conn).await
    } else {
        active_model.update(conn).await
    }
    .map_err(map_db_err)?;

    Ok(model.into())
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_active(&self) -> UserResult<Vec<User>> {
        let models = entity::Entity::find()
            .filter(entity::Column::Archived.eq(false))
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await
            .map_err(UserError::database)?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn find_active_by_ids(&self, ids: &[UserId]) -> UserResult<Vec<User>> {
        let models = entity::Entity::find()
            .filter(entity::Column::Id.is_in(ids.iter().copied()))
            .filter(entity::Column::Archived.eq(false))
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await
            .map_err(UserError::database)?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn find_active_by_id(&self, id: UserId) -> UserResult<Option<User>> {
        let model = entity::Entity::find_by_id(id)
            .filter(entity::Column::Archived.eq(false))
            .one(&self.db)
            .await
            .map_err(UserError::database)?;

        Ok(model.map(User::from))
    }

    async fn find_active_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let model = entity::Entity::find()
            .filter(Expr::cust_with_values(
                "lower(\"email\") = $1",
                [email.to_lowercase()],
            ))
            .filter(entity::Column::Archived.eq(false))
            .one(&self.db)
            .await
            .map_err(UserError::database)?;

        Ok(model.map(User::from))
    }

    async fn find_by_id(&self, id: UserId) -> UserResult<Option<User>> {
        let model = entity::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(UserError::database)?;

        Ok(model.map(User::from))
    }

    async fn find_all_by_ids(&self, ids: &[UserId]) -> UserResult<Vec<User>> {
        let models = entity::Entity::find()
            .filter(entity::Column::Id.is_in(ids.iter().copied()))
            .order_by_asc(entity::Column::Id)
            .all(&self.db)
            .await
            .map_err(UserError::database)?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn save(&self, user: User) -> UserResult<User> {
        let saved = persist(&self.db, user).await?;
        tracing::debug!(user_id = ?saved.id, archived = saved.archived, "Saved user");
        Ok(saved)
    }

    async fn save_all(&self, users: Vec<User>) -> UserResult<Vec<User>> {
        let txn = self.db.begin().await.map_err(UserError::database)?;

        let mut saved = Vec::with_capacity(users.len());
        for user in users {
            match persist(&txn, user).await {
                Ok(user) => saved.push(user),
                Err(err) => {
                    txn.rollback().await.map_err(UserError::database)?;
                    return Err(err);
                }
            }
        }

        txn.commit().await.map_err(map_db_err)?;
        tracing::debug!(count = saved.len(), "Saved user batch");
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sqlx::error::{DatabaseError, ErrorKind};
    use sea_orm::{DatabaseBackend, MockDatabase, Transaction};
    use std::borrow::Cow;
    use std::sync::Arc;

    #[derive(Debug)]
    struct ActiveEmailTaken;

    impl std::fmt::Display for ActiveEmailTaken {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.message())
        }
    }

    impl std::error::Error for ActiveEmailTaken {}

    impl DatabaseError for ActiveEmailTaken {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint \"ux_user_detail_active_email\""
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            Some(Cow::Borrowed(UNIQUE_VIOLATION))
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    fn unique_violation() -> DbErr {
        DbErr::Query(RuntimeErr::SqlxError(Arc::new(
            sea_orm::sqlx::Error::Database(Box::new(ActiveEmailTaken)),
        )))
    }

    fn statements(log: &[Transaction]) -> Vec<String> {
        log.iter()
            .flat_map(|txn| txn.statements())
            .map(|stmt| stmt.sql.clone())
            .collect()
    }

    fn row(id: i64, name: &str, email: &str, archived: bool) -> entity::Model {
        entity::Model {
            id,
            name: name.to_string(),
            email: email.to_string(),
            archived,
        }
    }

    #[tokio::test]
    async fn test_find_active_maps_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                row(1, "Alex", "alex@demo.com", false),
                row(2, "Sam", "sam@demo.com", false),
            ]])
            .into_connection();

        let users = PgUserStore::new(db).find_active().await.unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[0], User::new("Alex", "alex@demo.com").with_id(1));
    }

    #[tokio::test]
    async fn test_find_by_id_sees_archived_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row(3, "Alex", "alex@demo.com", true)]])
            .into_connection();

        let user = PgUserStore::new(db).find_by_id(3).await.unwrap().unwrap();
        assert!(user.archived);
    }

    #[tokio::test]
    async fn test_find_active_by_email_absent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<entity::Model>::new()])
            .into_connection();

        let found = PgUserStore::new(db)
            .find_active_by_email("Alex@Demo.com")
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_save_inserts_new_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row(1, "Alex", "alex@demo.com", false)]])
            .into_connection();

        let saved = PgUserStore::new(db)
            .save(User::new("Alex", "alex@demo.com"))
            .await
            .unwrap();

        assert_eq!(saved.id, Some(1));
    }

    #[tokio::test]
    async fn test_save_all_updates_in_transaction() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                vec![row(1, "Alex", "alex@demo.com", true)],
                vec![row(2, "Sam", "sam@demo.com", true)],
            ])
            .into_connection();

        let mut alex = User::new("Alex", "alex@demo.com").with_id(1);
        let mut sam = User::new("Sam", "sam@demo.com").with_id(2);
        alex.archive();
        sam.archive();

        let saved = PgUserStore::new(db.clone())
            .save_all(vec![alex, sam])
            .await
            .unwrap();
        assert!(saved.iter().all(|u| u.archived));

        let sql = statements(&db.into_transaction_log());
        assert_eq!(sql.len(), 4);
        assert_eq!(sql[0], "BEGIN");
        assert!(sql[1].starts_with("UPDATE"));
        assert!(sql[2].starts_with("UPDATE"));
        assert_eq!(sql[3], "COMMIT");
    }

    #[tokio::test]
    async fn test_save_all_rolls_back_when_a_row_fails() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![row(1, "Alex", "alex@demo.com", true)]])
            .append_query_errors([DbErr::Custom("boom".to_string())])
            .into_connection();

        let mut alex = User::new("Alex", "alex@demo.com").with_id(1);
        let mut sam = User::new("Sam", "sam@demo.com").with_id(2);
        alex.archive();
        sam.archive();

        let err = PgUserStore::new(db.clone())
            .save_all(vec![alex, sam])
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::Internal(msg) if msg.contains("boom")));

        let sql = statements(&db.into_transaction_log());
        assert_eq!(sql.first().map(String::as_str), Some("BEGIN"));
        assert_eq!(sql.last().map(String::as_str), Some("ROLLBACK"));
        assert!(!sql.iter().any(|s| s == "COMMIT"));
    }

    #[test]
    fn test_unique_violation_maps_to_duplicate_email() {
        assert_eq!(map_db_err(unique_violation()), UserError::DuplicateEmail);
        assert!(matches!(
            map_db_err(DbErr::Custom("connection reset".to_string())),
            UserError::Internal(_)
        ));
    }

    #[tokio::test]
    async fn test_save_surfaces_index_violation_as_conflict() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([unique_violation()])
            .into_connection();

        let err = PgUserStore::new(db)
            .save(User::new("Alex", "ALEX@demo.com"))
            .await
            .unwrap_err();
        assert_eq!(err, UserError::DuplicateEmail);
    }

    #[tokio::test]
    async fn test_query_failure_is_internal() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_errors([DbErr::Custom("connection reset".to_string())])
            .into_connection();

        let err = PgUserStore::new(db).find_active().await.unwrap_err();
        assert!(matches!(err, UserError::Internal(msg) if msg.contains("connection reset")));
    }
}
