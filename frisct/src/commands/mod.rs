//! Command modules for the frisct CLI.
//!
//! Each subcommand lives in its own file and exposes a `run_*` function
//! taking a plain `*Args` struct, so the clap layer in `main.rs` stays a
//! thin translation.

pub mod common;

pub mod build;
pub mod check;
pub mod lex;
pub mod lexgen;

pub use build::{run_build, BuildArgs};
pub use check::{run_check, CheckArgs};
pub use lex::{run_lex, LexArgs};
pub use lexgen::{run_lexgen, LexgenArgs};
