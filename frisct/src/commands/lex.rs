//! The `lex` subcommand: run the table-driven lexical analyzer over source
//! text, printing one `UNIT line lexeme` token per line. Bytes no rule can
//! match are reported on stderr and skipped.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context;

use frisc_lexgen::LexTable;
use frisc_util::Handler;

use crate::commands::common::read_input_bytes;
use crate::error::FrisctError;

/// Arguments for the lex command, already merged with config defaults.
pub struct LexArgs {
    /// Serialized table produced by `lexgen`.
    pub table: PathBuf,
    /// Source text; stdin when absent.
    pub input: Option<PathBuf>,
    /// Overrides the table's recorded starting lex state.
    pub starting_state: Option<String>,
}

/// Loads the table and tokenizes the input.
pub fn run_lex(args: LexArgs) -> anyhow::Result<()> {
    let file = File::open(&args.table)
        .with_context(|| format!("opening {}", args.table.display()))?;
    let mut table = LexTable::read_from(&mut BufReader::new(file))
        .with_context(|| format!("reading {}", args.table.display()))?;

    if let Some(state) = args.starting_state {
        if !table.states.contains_key(&state) {
            return Err(FrisctError::Validation(format!(
                "starting state `{state}` is not a lex state of this table"
            ))
            .into());
        }
        table.starting_state = state;
    }

    let source = read_input_bytes(args.input.as_deref())?;
    let handler = Handler::new();
    let tokens = frisc_drv::tokenize(&table, &source, &handler)?;

    print!("{tokens}");
    eprint!("{}", frisc_drv::render_lex_diagnostics(&handler));
    Ok(())
}
