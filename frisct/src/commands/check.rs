//! The `check` subcommand: semantic analysis only. Prints nothing for a
//! well-typed program; prints the first offending production (or the
//! `main`/`funkcija` marker) and exits 1 otherwise.

use std::path::PathBuf;

use tracing::info;

use crate::commands::common::read_input;

/// Arguments for the check command.
pub struct CheckArgs {
    /// Parse-tree dump; stdin when absent.
    pub input: Option<PathBuf>,
}

/// Runs L3 and returns the process exit code.
pub fn run_check(args: CheckArgs) -> anyhow::Result<i32> {
    let tree_dump = read_input(args.input.as_deref())?;
    match frisc_drv::check(&tree_dump)? {
        frisc_drv::Outcome::Accepted(_) => {
            info!("program is well-typed");
            Ok(0)
        }
        frisc_drv::Outcome::Rejected(diagnostic) => {
            println!("{diagnostic}");
            Ok(1)
        }
    }
}
