use thiserror::Error;

#[derive(Debug, Error)]
pub enum TreeError {
    #[error("parse tree dump is empty")]
    Empty,

    #[error("line {0}: leaf is missing its `line` or `lexeme` field")]
    MalformedLeaf(usize),

    #[error("line {line}: `{text}` is not a valid source line number")]
    InvalidLineNumber { line: usize, text: String },
}

pub type Result<T> = std::result::Result<T, TreeError>;
