//! Frisct CLI - the command-line front end for the frisc pipeline.
//!
//! This is the main entry point for the frisct application. It uses clap
//! for argument parsing and dispatches to the command handlers: `lexgen`
//! (compile a lexer specification), `lex` (tokenize source text), `check`
//! (semantic analysis), and `build` (semantic analysis + FRISC assembly).

mod commands;
mod config;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{
    run_build, run_check, run_lex, run_lexgen, BuildArgs, CheckArgs, LexArgs, LexgenArgs,
};
use config::Config;

/// Frisct - compiler tooling for the frisc teaching dialect
///
/// Frisct drives the two halves of the pipeline: compiling and running
/// lexer tables, and turning externally produced parse trees into FRISC
/// assembly.
#[derive(Parser, Debug)]
#[command(name = "frisct")]
#[command(author = "Frisc Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compiler tooling for the frisc teaching dialect", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, env = "FRISCT_VERBOSE")]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "FRISCT_CONFIG")]
    config: Option<PathBuf>,

    /// Disable color output
    #[arg(long, global = true, env = "FRISCT_NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands for the frisct CLI.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Compile a lexer specification into a serialized table
    ///
    /// Reads the specification (named definitions, lex states, rules) and
    /// writes the ε-NFA table the `lex` subcommand executes.
    Lexgen(LexgenCommand),

    /// Tokenize source text with a compiled table
    ///
    /// Prints one `UNIT line lexeme` token per line on stdout; bytes no
    /// rule matches are reported on stderr and skipped.
    Lex(LexCommand),

    /// Type-check a parse tree
    ///
    /// Exits 0 silently for a well-typed program; prints the first
    /// offending production and exits 1 otherwise.
    Check(CheckCommand),

    /// Compile a parse tree to FRISC assembly
    ///
    /// Runs the same checks as `check`, then emits the assembly listing.
    Build(BuildCommand),
}

/// Arguments for the lexgen subcommand.
#[derive(Parser, Debug)]
struct LexgenCommand {
    /// Specification file (default: stdin)
    input: Option<PathBuf>,

    /// Table output path (default: from config)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// Arguments for the lex subcommand.
#[derive(Parser, Debug)]
struct LexCommand {
    /// Source file to tokenize (default: stdin)
    input: Option<PathBuf>,

    /// Serialized table path (default: from config)
    #[arg(short, long)]
    table: Option<PathBuf>,

    /// Override the table's starting lex state
    #[arg(short, long)]
    starting_state: Option<String>,
}

/// Arguments for the check subcommand.
#[derive(Parser, Debug)]
struct CheckCommand {
    /// Parse-tree dump (default: stdin)
    input: Option<PathBuf>,
}

/// Arguments for the build subcommand.
#[derive(Parser, Debug)]
struct BuildCommand {
    /// Parse-tree dump (default: stdin)
    input: Option<PathBuf>,

    /// Assembly output path (default: from config, else stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.no_color)?;

    let config = load_config(cli.config.as_deref())?;

    let code = execute_command(cli.command, config)?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Initialize the logging system.
///
/// The quiet default keeps stdout/stderr byte-exact for the pipeline's
/// fixed protocols; `--verbose` (or `RUST_LOG`) opts into the ambient
/// tracing output.
fn init_logging(verbose: bool, no_color: bool) -> anyhow::Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"))
    };

    let subscriber = fmt::layer()
        .with_ansi(!no_color)
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    Ok(())
}

/// Load configuration from an explicit path or the default location.
fn load_config(config_path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    let config = match config_path {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    Ok(config)
}

/// Execute the selected command, returning the process exit code.
fn execute_command(command: Commands, config: Config) -> anyhow::Result<i32> {
    match command {
        Commands::Lexgen(args) => {
            run_lexgen(LexgenArgs {
                input: args.input,
                output: args.output.unwrap_or_else(|| PathBuf::from(&config.table_path)),
                echo_table_path: config.lex.echo_table_path,
            })?;
            Ok(0)
        }
        Commands::Lex(args) => {
            run_lex(LexArgs {
                table: args.table.unwrap_or_else(|| PathBuf::from(&config.table_path)),
                input: args.input,
                starting_state: args.starting_state.or(config.lex.starting_state),
            })?;
            Ok(0)
        }
        Commands::Check(args) => run_check(CheckArgs { input: args.input }),
        Commands::Build(args) => run_build(BuildArgs {
            input: args.input,
            output: args.output.or_else(|| config.build.output.as_ref().map(PathBuf::from)),
        }),
    }
}
