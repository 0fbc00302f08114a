//! Error types for the frisct CLI.
//!
//! Stage crates report their own typed errors; this enum covers the
//! failures the CLI layer itself can produce before or after a stage runs.

use thiserror::Error;

/// Errors raised by the frisct CLI layer.
#[derive(Error, Debug)]
pub enum FrisctError {
    /// A configuration file is missing, unreadable, or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// A command's inputs don't fit together (e.g. an unknown lex state
    /// passed as a starting-state override).
    #[error("validation error: {0}")]
    Validation(String),

    /// A file read or write failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FrisctError>;
