//! Error type definitions.
//!
//! This module defines the error enums used throughout the crate plus the
//! survey outcome categories counted per pass.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// A configuration value is out of range.
    #[error("Configuration error: {0}")]
    ConfigError(&'static str),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// A stored record could not be encoded or decoded.
    #[error("Record encoding error: {0}")]
    RecordError(#[from] serde_json::Error),
}

/// Reading a content profile before it has been built.
///
/// Distinct from asking about a host the profile never saw, which is a normal
/// zero answer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    #[error("Invalid profile: content profile has not been built")]
    InvalidProfile,

    /// The page's own URL has no usable host, so nothing can be attributed.
    #[error("Invalid origin URL: {0}")]
    InvalidOrigin(String),
}

/// Record lock acquisition failures.
#[derive(Error, Debug)]
pub enum LockError {
    #[error("Could not get exclusive lock on {key} within {waited_ms} ms")]
    Timeout { key: String, waited_ms: u128 },

    /// The lock table could not be read or written.
    #[error("Lock table error: {0}")]
    Store(#[from] DatabaseError),
}

/// Failures surfaced to the operator by administrative actions.
///
/// In every case the record is left exactly as it was.
#[derive(Error, Debug)]
pub enum AdminError {
    #[error("No site with id {0}")]
    NotFound(String),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error("Site {id} cannot be changed: {reason}")]
    InvalidState { id: String, reason: &'static str },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid start time '{0}': expected e.g. '05 Aug 2006 18:44 EDT'")]
    InvalidStartTime(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Class of transport failure behind a probe or resource fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportFailure {
    Timeout,
    Io,
}

impl TransportFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportFailure::Timeout => "Socket timeout",
            TransportFailure::Io => "IO Exception",
        }
    }
}

/// A request that never produced a usable response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}: {message}", .kind.as_str())]
pub struct TransportError {
    pub kind: TransportFailure,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportFailure, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// What happened to one site during a survey pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum SurveyOutcome {
    /// 200 with the original title
    Up,
    /// 200 with a different title
    TitleChanged,
    /// Any non-200 status
    HttpError,
    Timeout,
    TransportError,
    /// Lock held elsewhere; nothing recorded this pass
    SkippedLocked,
    /// The ping pushed the site over its threshold
    Stopped,
}

impl std::fmt::Display for SurveyOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SurveyOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurveyOutcome::Up => "Up",
            SurveyOutcome::TitleChanged => "Title changed",
            SurveyOutcome::HttpError => "HTTP error status",
            SurveyOutcome::Timeout => "Probe timeout",
            SurveyOutcome::TransportError => "Transport error",
            SurveyOutcome::SkippedLocked => "Skipped (record locked)",
            SurveyOutcome::Stopped => "Declared down",
        }
    }
}
