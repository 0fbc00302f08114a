use thiserror::Error;

#[derive(Debug, Error)]
pub enum LexRunError {
    #[error("malformed lex table: {0}")]
    Table(#[from] frisc_lexgen::LexGenError),

    #[error("rule entered unknown lex state `{0}`")]
    UnknownLexState(String),
}

pub type Result<T> = std::result::Result<T, LexRunError>;
