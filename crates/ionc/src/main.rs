//! The Ion compiler front-end CLI.
//!
//! Provides a single `compile <path>` command: lex, parse, resolve, bind and
//! type-solve a source file, reporting diagnostics and exiting with the diagnostic's
//! code on failure.
//!
//! Verbosity is controlled by repeating `-v`, or by the `ION_LOG` environment
//! variable (`ION_LOG=debug ionc compile foo.ion`), which takes precedence when set.

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use ion_common::span::SourceFile;
use ion_common::Diagnostic;

#[derive(Parser)]
#[command(name = "ionc", version, about = "The Ion compiler front end")]
struct Cli {
    /// Path to the .ion source file.
    path: PathBuf,

    /// Raise the ambient log level; repeat for more detail (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print the parsed AST (debug form) to stdout before type-solving.
    #[arg(long = "dump-ast")]
    dump_ast: bool,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env("ION_LOG").unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    process::exit(compile(&cli.path, cli.dump_ast));
}

/// Runs the full front-end pipeline over a single file, returning the process exit
/// code: `0` on success, a diagnostic's own code on a reported failure, `255` if the
/// file itself could not be read.
fn compile(path: &Path, dump_ast: bool) -> i32 {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: could not read '{}': {}", path.display(), err);
            return 255;
        }
    };

    let file = SourceFile::new(path.display().to_string(), source.clone());

    tracing::debug!(file = %path.display(), "lexing and parsing");
    let (statements, parse_warnings) = match ion_parser::parse(Arc::clone(&file), &source) {
        Ok(result) => result,
        Err(diagnostic) => return report_fatal(&diagnostic),
    };

    if dump_ast {
        println!("{statements:#?}");
    }

    tracing::debug!(statements = statements.len(), "resolving, binding and solving types");
    let checked = match ion_sema::check(&statements) {
        Ok(checked) => checked,
        Err(diagnostic) => return report_fatal(&diagnostic),
    };

    for warning in parse_warnings.iter().chain(checked.warnings.iter()) {
        eprint!("{warning}");
    }

    tracing::info!(file = %path.display(), "check succeeded");
    0
}

fn report_fatal(diagnostic: &Diagnostic) -> i32 {
    eprint!("{diagnostic}");
    diagnostic.exit_code()
}
