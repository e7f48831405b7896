//! Custom extractors for Axum handlers.
//!
//! Both extractors reject with an [`AppError`](crate::errors::AppError)
//! response so clients always receive the standard error body.

pub mod id_path;
pub mod validated_json;

pub use id_path::IdPath;
pub use validated_json::ValidatedJson;
