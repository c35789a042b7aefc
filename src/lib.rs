//! mailcast: send one message to many recipients over SMTP, track each
//! delivery, and keep a JSON log per job.

pub mod api;
pub mod cli;
pub mod core;
pub mod dispatch;
pub mod recipients;
pub mod store;

pub use crate::core::config::{Config, ConfigBuilder, SmtpSettings, TlsPolicy};
pub use crate::core::error::{AppError, Result};
pub use crate::core::models::{
    BodySource, Delivery, Job, MessageTemplate, OverallStatus, RecipientOutcome,
};
pub use crate::core::status::aggregate;
pub use crate::dispatch::{DispatchEngine, MailTransport, OutgoingMessage, SmtpMailer};
pub use crate::store::JobLogStore;
