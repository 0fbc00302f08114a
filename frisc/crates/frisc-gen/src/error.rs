//! Error type for L4, the FRISC assembly code generator.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodeGenError {
    /// L4 runs `frisc-sem`'s analysis rather than duplicating its checks:
    /// any semantic failure surfaces here with the same fixed diagnostic.
    #[error(transparent)]
    Semantic(#[from] frisc_sem::SemError),

    /// The tree or scope structure didn't match what a successful semantic
    /// pass guarantees it should look like: a bug in this crate, not a
    /// user-facing diagnostic.
    #[error("codegen contract violation at `{symbol}`: {reason}")]
    MalformedTree { symbol: String, reason: String },
}

pub type Result<T> = std::result::Result<T, CodeGenError>;
