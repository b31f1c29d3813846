//! Binary entry point for `scriptlang`.
//!
//! This is deliberately thin: it owns only the things spec.md places out
//! of scope for the language core — choosing file-mode vs. REPL-mode,
//! terminal I/O, and line-buffered prompt formatting. All lexing,
//! parsing and evaluation happens in the library crate.

mod cli;

use std::io::{self, BufRead, Write};

use cli::Cli;
use log::info;
use scriptlang::environment::Environment;
use scriptlang::error::ErrorReporter;

const USAGE_ERROR: i32 = 64;
const COMPILE_ERROR: i32 = 65;
const RUNTIME_ERROR: i32 = 70;

fn main() {
    let cli = Cli::init();
    simple_logger::init_with_level((&cli.verbosity).into()).unwrap();

    let exit_code = match &cli.file {
        Some(path) => run_file(path, cli.json_errors),
        None => run_repl(cli.json_errors),
    };

    std::process::exit(exit_code);
}

fn run_file(path: &std::path::Path, json_errors: bool) -> i32 {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Could not read file '{}': {err}", path.display());
            return USAGE_ERROR;
        }
    };

    info!("running script {}", path.display());
    let mut stdout = io::stdout();
    let reporter = scriptlang::run_source(&source, &mut stdout);
    emit(&reporter, json_errors);

    if reporter.had_error() {
        COMPILE_ERROR
    } else if reporter.had_runtime_error() {
        RUNTIME_ERROR
    } else {
        0
    }
}

fn run_repl(json_errors: bool) -> i32 {
    let globals = Environment::global();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        let _ = stdout.flush();

        let mut line = String::new();
        let bytes_read = match stdin.lock().read_line(&mut line) {
            Ok(n) => n,
            Err(err) => {
                eprintln!("Failed to read from stdin: {err}");
                return USAGE_ERROR;
            }
        };
        if bytes_read == 0 {
            // EOF (Ctrl-D): end the session cleanly.
            return 0;
        }

        let reporter = scriptlang::run_repl_line(&line, globals.clone(), &mut stdout);
        emit(&reporter, json_errors);
        // The sticky flags are scoped to `reporter`, which is dropped here
        // — the next input starts with a fresh one, so the REPL stays
        // usable after a failed line.
    }
}

fn emit(reporter: &ErrorReporter, json_errors: bool) {
    if json_errors {
        reporter.emit_json(io::stderr());
    } else {
        reporter.emit_human(io::stderr());
    }
}
