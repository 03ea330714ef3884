//! Common error types for Spectral

use thiserror::Error;

/// Common result type for Spectral operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Spectral crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A value did not match its schema
    #[error("Validation error: {0}")]
    Validation(#[from] serde_json::Error),

    /// The kernel could not be reached or answered with an error
    #[error("Kernel error: {0}")]
    Kernel(#[from] crate::kernel::KernelError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
