//! The `lexgen` subcommand: compile a lexer specification into the
//! serialized ε-NFA table the `lex` subcommand executes.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Context;
use tracing::info;

use crate::commands::common::read_input;

/// Arguments for the lexgen command, already merged with config defaults.
pub struct LexgenArgs {
    /// Specification file; stdin when absent.
    pub input: Option<PathBuf>,
    /// Where to write the serialized table.
    pub output: PathBuf,
    /// Report the output path on success.
    pub echo_table_path: bool,
}

/// Compiles the specification and writes the table.
pub fn run_lexgen(args: LexgenArgs) -> anyhow::Result<()> {
    let spec = read_input(args.input.as_deref())?;
    let table = frisc_drv::generate_table(&spec)?;

    let file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let mut writer = BufWriter::new(file);
    table
        .write_to(&mut writer)
        .with_context(|| format!("writing {}", args.output.display()))?;

    info!(states = table.states.len(), "lexer table generated");
    if args.echo_table_path {
        eprintln!("wrote {}", args.output.display());
    }
    Ok(())
}
