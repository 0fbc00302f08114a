//! frisc-drv - wires the four compiler stages into runnable pipelines.
//!
//! The workspace splits into two half-pipelines joined only by textual
//! formats: the lexer side (`frisc-lexgen` compiles a specification into a
//! table, `frisc-lexrun` drives it over source text) and the compiler side
//! (`frisc-sem` checks the parse tree an external parser produced,
//! `frisc-gen` lowers it to FRISC assembly). This crate owns the glue and
//! the protocol decisions the stage crates deliberately don't make: what
//! goes to stdout versus stderr, and which outcomes are diagnostics rather
//! than errors.
//!
//! A semantic rule violation is not a Rust error here: the contract is
//! "print the offending production, exit 1", so it surfaces as
//! [`Outcome::Rejected`] for the caller to report. `Err` is reserved for
//! malformed inputs (a truncated table, an unreadable tree dump) that
//! indicate a broken artifact rather than a broken source program.

use anyhow::{anyhow, Context};
use tracing::debug;

use frisc_lexgen::LexTable;
use frisc_lexrun::Event;
use frisc_sem::{ScopeTree, SemError};
use frisc_util::{Handler, Level};

/// How a semantic-analysis-dependent stage finished: either its product,
/// or the fixed diagnostic line to print before exiting nonzero.
#[derive(Debug)]
pub enum Outcome<T> {
    Accepted(T),
    /// The first rule violation, already rendered in its fixed reporting
    /// form (`LHS ::= ...`, `main`, or `funkcija`).
    Rejected(String),
}

impl<T> Outcome<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted(_))
    }

    pub fn rejection(&self) -> Option<&str> {
        match self {
            Outcome::Accepted(_) => None,
            Outcome::Rejected(diagnostic) => Some(diagnostic),
        }
    }
}

/// L1-Gen: compiles a lexer specification into its table.
pub fn generate_table(spec: &str) -> anyhow::Result<LexTable> {
    frisc_lexgen::generate(spec).context("compiling lexer specification")
}

/// L1-Run: tokenizes `source`, returning the token stream as the
/// line-oriented `UNIT line lexeme` text the downstream parser consumes.
/// Unrecognized bytes don't stop the run; each one lands in `handler` as a
/// warning for the caller to forward to stderr.
pub fn tokenize(table: &LexTable, source: &[u8], handler: &Handler) -> anyhow::Result<String> {
    let events = frisc_lexrun::analyze(table, source).context("running lexical analysis")?;
    let mut out = String::new();
    for event in events {
        match event {
            Event::Token { unit, line, lexeme } => {
                out.push_str(&format!("{unit} {line} {lexeme}\n"));
            }
            Event::UnrecognizedByte { byte, line } => {
                handler.emit(
                    Level::Warning,
                    format!("unrecognized byte '{}'", byte as char),
                    line,
                );
            }
        }
    }
    Ok(out)
}

/// L3: parses the indented tree dump and runs semantic analysis over it.
pub fn check(tree_dump: &str) -> anyhow::Result<Outcome<ScopeTree>> {
    let tree = frisc_tree::parse(tree_dump).context("reading parse-tree dump")?;
    match frisc_sem::analyze(&tree) {
        Ok(scopes) => Ok(Outcome::Accepted(scopes)),
        Err(SemError::MalformedTree { symbol, reason }) => {
            Err(anyhow!("malformed parse tree at `{symbol}`: {reason}"))
        }
        Err(diagnostic) => Ok(Outcome::Rejected(diagnostic.to_string())),
    }
}

/// L3 + L4: semantic analysis, then FRISC assembly emission.
pub fn build(tree_dump: &str) -> anyhow::Result<Outcome<String>> {
    let tree = frisc_tree::parse(tree_dump).context("reading parse-tree dump")?;
    match frisc_gen::generate(&tree) {
        Ok(asm) => {
            debug!(bytes = asm.len(), "assembly listing complete");
            Ok(Outcome::Accepted(asm))
        }
        Err(frisc_gen::CodeGenError::Semantic(SemError::MalformedTree { symbol, reason })) => {
            Err(anyhow!("malformed parse tree at `{symbol}`: {reason}"))
        }
        Err(frisc_gen::CodeGenError::Semantic(diagnostic)) => {
            Ok(Outcome::Rejected(diagnostic.to_string()))
        }
        Err(internal @ frisc_gen::CodeGenError::MalformedTree { .. }) => {
            Err(anyhow!(internal).context("emitting FRISC assembly"))
        }
    }
}

/// Renders `handler`'s accumulated lexical diagnostics the way the lexer
/// protocol reports them: one line per skipped byte, for stderr.
pub fn render_lex_diagnostics(handler: &Handler) -> String {
    let mut out = String::new();
    for d in handler.diagnostics() {
        out.push_str(&format!("line {}: {}\n", d.line, d.message));
    }
    out
}
