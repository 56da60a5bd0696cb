//! Error types for Parlor.

use thiserror::Error;

/// Common error type for Parlor.
#[derive(Error, Debug)]
pub enum ParlorError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Registry contract violation.
    ///
    /// Only a duplicate connection handle is actually fatal; an unknown
    /// handle on removal is tolerated by the hub and never reaches here.
    #[error("registry error: {0}")]
    Registry(#[from] crate::hub::RegistryError),
}

/// Result type alias for Parlor operations.
pub type Result<T> = std::result::Result<T, ParlorError>;
