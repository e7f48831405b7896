//! Notifications Domain
//!
//! Welcome notifications for newly registered users, and the mail service
//! that delivers them.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────┐
//! │ WelcomeDispatcher │  ← composes localized text, spawns the send
//! └─────────┬─────────┘
//!           │ HTTP (MailClient)
//! ┌─────────▼─────────┐
//! │  Mail handlers    │  ← POST /api/email/simple/send, 202 Accepted
//! └─────────┬─────────┘
//!           │
//! ┌─────────▼─────────┐
//! │  Email provider   │  ← SMTP, log-only, mock
//! └───────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_notifications::{BundledMessages, HttpMailClient, NotificationConfig, WelcomeDispatcher};
//!
//! let config = NotificationConfig::from_env()?;
//! let dispatcher = WelcomeDispatcher::new(
//!     Arc::new(HttpMailClient::new(&config)?),
//!     Arc::new(BundledMessages::new()),
//!     config.email_from.clone(),
//! );
//!
//! // returns immediately; failures are logged
//! dispatcher.dispatch_welcome("Alex", "alex@demo.com", "en");
//! ```

pub mod client;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod messages;
pub mod models;
pub mod providers;

pub use client::{HttpMailClient, MailClient, NotificationConfig};
pub use dispatcher::WelcomeDispatcher;
pub use error::{NotificationError, NotificationResult};
pub use messages::{BundledMessages, MessageSource, preferred_locale};
pub use models::NotificationRequest;
pub use providers::{EmailProvider, LogProvider, MockEmailProvider, SmtpConfig, SmtpProvider};
