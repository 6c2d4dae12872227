/// Error types for the class portal data layer.
/// Validation errors surface synchronously; remote errors stay inside the sync client.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Username already exists: {0}")]
    DuplicateUsername(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Access blocked for user: {0}")]
    Blocked(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Server communication error: {0}")]
    ServerError(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Database error: {0}")]
    DbError(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, PortalError>;
