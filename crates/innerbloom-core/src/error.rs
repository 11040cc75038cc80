//! Core error types for innerbloom-core.
//!
//! User-recoverable conditions (`AlreadyCheckedInToday`, `JourneyAlreadyActive`)
//! live next to infrastructure failures so callers can match on one enum.
//! Persist failures are normally reported as warnings by the state container
//! rather than returned, see [`crate::container::CommandOutcome`].

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Core error type for innerbloom-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A check-in for this calendar day already exists.
    #[error("Already checked in today ({date})")]
    AlreadyCheckedInToday { date: NaiveDate },

    /// `start_journey` was called while another journey is in progress.
    #[error("Journey '{journey_id}' is already active")]
    JourneyAlreadyActive { journey_id: String },

    /// Catalog lookup failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// No journal entry with this id.
    #[error("Unknown journal entry: {0}")]
    UnknownJournalEntry(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Persistent store errors
    #[error("Persist failure: {0}")]
    Persist(#[from] StoreError),

    /// Remote enrichment errors
    #[error(transparent)]
    Enrichment(#[from] EnrichmentError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Persistent store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error for key '{key}': {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Data directory could not be resolved or created.
    #[error("Data directory unavailable: {0}")]
    DataDir(String),

    /// Key cannot be used as a file name.
    #[error("Invalid document key '{0}': use ASCII letters, digits, '-' or '_'")]
    InvalidKey(String),

    /// Injected failure (memory store only).
    #[error("Storage rejected write for key '{0}'")]
    Rejected(String),
}

/// Failure of a call to the remote generative-language service.
///
/// Every transport, status and parse error collapses into `Unavailable`;
/// callers either keep the retry flag set or substitute fallback text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentError {
    #[error("Enrichment unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for EnrichmentError {
    fn from(err: reqwest::Error) -> Self {
        EnrichmentError::Unavailable(err.to_string())
    }
}

/// Catalog errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Lookup of an id that is not in the catalog.
    #[error("Unknown {kind} id: {id}")]
    UnknownId { kind: &'static str, id: String },

    /// The same id appears twice.
    #[error("Duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },

    /// The catalog failed validation at load time.
    #[error("Invalid catalog: {0}")]
    Invalid(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be resolved
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Rating outside 1..=5
    #[error("{field} must be between 1 and 5, got {value}")]
    RatingOutOfRange { field: &'static str, value: u8 },

    /// Empty value where content is required
    #[error("{0} must not be empty")]
    Empty(&'static str),

    /// The same item given twice
    #[error("duplicate value: {0}")]
    Duplicate(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
