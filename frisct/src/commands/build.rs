//! The `build` subcommand: semantic analysis plus FRISC code generation.
//! The assembly listing goes to stdout (or `--output`); a semantic
//! violation prints its fixed diagnostic and exits 1 without writing any
//! assembly.

use std::path::PathBuf;

use tracing::info;

use crate::commands::common::{read_input, write_output};

/// Arguments for the build command, already merged with config defaults.
pub struct BuildArgs {
    /// Parse-tree dump; stdin when absent.
    pub input: Option<PathBuf>,
    /// Assembly destination; stdout when absent.
    pub output: Option<PathBuf>,
}

/// Runs L3 + L4 and returns the process exit code.
pub fn run_build(args: BuildArgs) -> anyhow::Result<i32> {
    let tree_dump = read_input(args.input.as_deref())?;
    match frisc_drv::build(&tree_dump)? {
        frisc_drv::Outcome::Accepted(asm) => {
            write_output(args.output.as_deref(), &asm)?;
            info!(bytes = asm.len(), "assembly written");
            Ok(0)
        }
        frisc_drv::Outcome::Rejected(diagnostic) => {
            println!("{diagnostic}");
            Ok(1)
        }
    }
}
