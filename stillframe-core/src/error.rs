//! Error types for stillframe

use thiserror::Error;

/// Main error type for stillframe operations
///
/// Errors are always surfaced synchronously to the caller; the library
/// performs no automatic retry.
#[derive(Error, Debug)]
pub enum Error {
    /// Model file missing, unreadable, or format-invalid
    #[error("failed to load model: {0}")]
    Load(String),

    /// Offscreen surface unusable or a draw failure
    #[error("render failed: {0}")]
    Render(String),

    /// Output path unwritable or output format unsupported
    #[error("failed to write image: {0}")]
    Write(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for stillframe operations
pub type Result<T> = std::result::Result<T, Error>;
