use thiserror::Error;

/// Failures while compiling a lexer specification into an ε-NFA table.
#[derive(Debug, Error)]
pub enum LexGenError {
    #[error("line {line}: malformed specification: {reason}")]
    MalformedSpec { line: usize, reason: String },

    #[error("unknown named definition `{name}`")]
    UnknownDefinition { name: String },

    #[error("unterminated group starting at token {index}")]
    UnterminatedGroup { index: usize },

    #[error("unterminated named-definition reference starting at token {index}")]
    UnterminatedReference { index: usize },
}

pub type Result<T> = std::result::Result<T, LexGenError>;
