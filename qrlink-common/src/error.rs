//! Internal error type for qrlink collaborators
//!
//! Config loading and database access report [`Error`]; stage boundaries
//! convert it into a [`crate::StageError`] before the orchestrator sees it.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Connect, statement, or close failure from the record store
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Config file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file unparseable, or a database URL with an unsupported scheme
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database URL that cannot carry the configured credentials
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
