//! Users Domain
//!
//! Registration, lookup, renaming and soft deletion of user records.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, welcome email dispatch
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← UserLifecycleService: validation, uniqueness, batches
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │  UserStore  │  ← trait + in-memory and PostgreSQL implementations
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← User, UserView, request shapes
//! └─────────────┘
//! ```
//!
//! Users are never removed: soft deletion sets `archived`. Archived users
//! disappear from active lookups and no longer reserve their email address,
//! but stay addressable by id for updates.
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{handlers, InMemoryUserStore, UserLifecycleService};
//!
//! let service = UserLifecycleService::new(InMemoryUserStore::new());
//!
//! // No welcome emails without a dispatcher
//! let router = handlers::router(service, None);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod validation;

pub use error::{UserError, UserResult};
pub use models::{RegistrationRequest, UpdateRequest, User, UserId, UserView};
pub use postgres::PgUserStore;
pub use repository::{InMemoryUserStore, UserStore};
pub use service::UserLifecycleService;
