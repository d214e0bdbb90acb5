//! Error types for Mushaf

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MushafError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed source data: {0}")]
    Source(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T, E = MushafError> = std::result::Result<T, E>;

impl MushafError {
    /// True when the underlying SQLite error was a UNIQUE / FK / CHECK violation.
    pub fn is_constraint_violation(err: &rusqlite::Error) -> bool {
        matches!(
            err.sqlite_error_code(),
            Some(rusqlite::ErrorCode::ConstraintViolation)
        )
    }
}

impl From<rusqlite::Error> for MushafError {
    fn from(e: rusqlite::Error) -> Self {
        MushafError::Database(e.to_string())
    }
}

impl From<reqwest::Error> for MushafError {
    fn from(e: reqwest::Error) -> Self {
        MushafError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for MushafError {
    fn from(e: serde_json::Error) -> Self {
        MushafError::Source(e.to_string())
    }
}

impl serde::Serialize for MushafError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
