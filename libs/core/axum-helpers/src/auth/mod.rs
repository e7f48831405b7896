//! HTTP basic authentication for service routes.

pub mod basic;

pub use basic::{BasicAuthConfig, basic_auth_middleware};
