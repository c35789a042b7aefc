//! Defines the custom error types for the mailcast application.

use std::{io, path::PathBuf};
use thiserror::Error;

/// The primary error type for dispatch, persistence and the front ends.
#[derive(Error, Debug)]
pub enum AppError {
    /// Error occurring during configuration loading or validation.
    #[error("Configuration Error: {0}")]
    Config(String),

    /// No recipient source was given, or none of the sources yielded an address.
    #[error("No recipients: {0}")]
    NoRecipients(String),

    /// The recipient list file could not be read or parsed.
    #[error("Recipient file '{}': {reason}", .path.display())]
    RecipientFile { path: PathBuf, reason: String },

    /// A submitted job is missing required fields or carries invalid ones.
    #[error("Invalid submission: {0}")]
    InvalidSubmission(String),

    /// A job id that cannot be used as a record key.
    #[error("Invalid job id '{0}'")]
    InvalidJobId(String),

    /// Both an inline body and a body file were supplied.
    #[error("Body and body file are mutually exclusive")]
    ConflictingBody,

    /// Error during SMTP communication setup or command execution.
    #[error("SMTP Error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// A sender or recipient address the transport refuses to parse.
    #[error("Address Error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The outgoing message could not be assembled.
    #[error("Message Build Error: {0}")]
    MessageBuild(String),

    /// The relay refused the message for a recipient.
    #[error("Recipient Rejected: {0}")]
    Rejected(String),

    /// The body file could not be read for an attempt.
    #[error("Body file '{}' unreadable: {source}", .path.display())]
    BodyFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An attachment could not be read for an attempt.
    #[error("Attachment '{}' unreadable: {source}", .path.display())]
    Attachment {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Error related to concurrency or task execution.
    #[error("Task Execution Error: {0}")]
    Task(String),

    /// No record has been persisted for the job id.
    #[error("No record for job '{0}'")]
    NotFound(String),

    /// A record exists but does not decode into a job.
    #[error("Corrupt record for job '{id}': {reason}")]
    CorruptRecord { id: String, reason: String },

    /// Error related to file input/output operations.
    #[error("IO Error: {0}")]
    Io(#[from] io::Error),

    /// Error during JSON serialization or deserialization.
    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<lettre::error::Error> for AppError {
    fn from(err: lettre::error::Error) -> Self {
        AppError::MessageBuild(err.to_string())
    }
}

impl AppError {
    /// True for errors that stop a job before any attempt is made.
    pub fn is_setup(&self) -> bool {
        matches!(
            self,
            AppError::Config(_)
                | AppError::NoRecipients(_)
                | AppError::RecipientFile { .. }
                | AppError::InvalidSubmission(_)
                | AppError::InvalidJobId(_)
                | AppError::ConflictingBody
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
