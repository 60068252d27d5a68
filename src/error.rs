//! Error handling for dones.
//!
//! This module provides:
//! - [`DonesError`]: The main error enum for all dones operations
//! - [`Result`]: Crate-wide result alias
//!
//! Duplicate marks and missing-key removals are defined as no-ops by the
//! store protocol and never surface here.

use std::io;

use thiserror::Error;

/// Main error type for dones operations.
#[derive(Error, Debug)]
pub enum DonesError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The backend was unreachable after the first attempt and every
    /// configured retry.
    #[error("Connection failed after {attempts} attempt(s): {source}")]
    Connection {
        attempts: usize,
        source: Box<DonesError>,
    },

    /// Commit or rollback infrastructure failure. A failing unit of work
    /// propagates its own error, not this variant.
    #[error("Transaction failed: {0}")]
    Transaction(String),

    #[error("Key encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// An operation ran against a store whose schema could not be set up.
    /// Schema creation is attempted transparently, so this normally never
    /// surfaces.
    #[error("Store not ready: {0}")]
    NotReady(String),

    #[error("Invalid connection url: {0}")]
    InvalidUrl(String),

    #[error("Invalid namespace: {0}")]
    InvalidNamespace(String),

    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias for dones operations.
pub type Result<T> = std::result::Result<T, DonesError>;
