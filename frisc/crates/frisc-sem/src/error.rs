use thiserror::Error;

/// The three fixed diagnostics semantic analysis can end in. Each one
/// halts the walk; there is no error recovery.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SemError {
    /// A production's type rule was violated. `production` is already
    /// rendered in the fixed `LHS ::= S1 S2 …` reporting format.
    #[error("{production}")]
    Production { production: String },

    /// No `int main(void)` in the global scope.
    #[error("main")]
    MissingMain,

    /// A function is referenced somewhere but never defined at global
    /// scope with a matching signature.
    #[error("funkcija")]
    UndefinedFunction,

    /// The input tree didn't match the shape the walker expects for a
    /// production (wrong child count, wrong node kind). This is a broken
    /// input artifact, not a user-facing diagnostic.
    #[error("malformed parse tree at `{symbol}`: {reason}")]
    MalformedTree { symbol: String, reason: String },
}

pub type Result<T> = std::result::Result<T, SemError>;
