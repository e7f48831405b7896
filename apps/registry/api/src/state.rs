//! Shared application state.

use sea_orm::DatabaseConnection;

/// Cloned into the readiness handler and the shutdown cleanup.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// PostgreSQL pool, absent when running on the in-memory store
    pub db: Option<DatabaseConnection>,
}
