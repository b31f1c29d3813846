//! Core of a tree-walking interpreter for a small, dynamically-typed,
//! lexically-scoped scripting language: lexer, recursive-descent parser,
//! and tree-walking evaluator, wired together behind a couple of small
//! run entry points. Host concerns (choosing file vs. REPL mode, terminal
//! I/O, prompt formatting) live in `main.rs`, not here.

pub mod ast;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod value;

use std::io::Write;

use environment::Environment;
use error::ErrorReporter;
use interpreter::Interpreter;
use lexer::Lexer;
use parser::Parser;
use token::TokenKind;

/// Run a complete script against a fresh global environment. Compile
/// errors (lexical or parse) abort before any evaluation happens; a
/// runtime error aborts remaining top-level statements. All outcomes are
/// recorded on the returned [`ErrorReporter`].
pub fn run_source(source: &str, stdout: &mut impl Write) -> ErrorReporter {
    let mut reporter = ErrorReporter::new(source);

    let tokens = Lexer::new(source).scan(&mut reporter);
    let statements = Parser::new(tokens, &mut reporter).parse_program();

    if reporter.had_error() {
        log::info!("compile errors present, skipping evaluation");
        return reporter;
    }

    log::info!("running {} top-level statement(s)", statements.len());
    let mut interpreter = Interpreter::new(stdout);
    interpreter.run(&statements, &mut reporter);
    reporter
}

/// Run one REPL input against an existing, carried-over global
/// environment (so variables defined in one input are visible in later
/// ones). Decides interactive single-expression mode vs. statement mode
/// per spec.md §6: if the final meaningful token before EOF is not a
/// semicolon, the input is parsed and evaluated as a single expression and
/// its value is printed; otherwise it is parsed and executed as
/// statements.
pub fn run_repl_line(source: &str, globals: Environment, stdout: &mut impl Write) -> ErrorReporter {
    let mut reporter = ErrorReporter::new(source);

    let tokens = Lexer::new(source).scan(&mut reporter);

    if is_single_expression_input(&tokens) {
        let mut parser = Parser::new(tokens, &mut reporter);
        match parser.parse_single_expression() {
            Ok(expr) => {
                if !reporter.had_error() {
                    let mut interpreter = Interpreter::with_globals(stdout, globals);
                    interpreter.run_expression(&expr, &mut reporter);
                }
            }
            Err(_) => {}
        }
        return reporter;
    }

    let statements = Parser::new(tokens, &mut reporter).parse_program();
    if reporter.had_error() {
        return reporter;
    }
    let mut interpreter = Interpreter::with_globals(stdout, globals);
    interpreter.run(&statements, &mut reporter);
    reporter
}

/// The last non-EOF token before end-of-input decides the mode: absence
/// of a trailing semicolon means "interactive single expression".
fn is_single_expression_input(tokens: &[token::Token]) -> bool {
    let last_meaningful = tokens
        .iter()
        .rev()
        .find(|t| t.kind != TokenKind::Eof);
    match last_meaningful {
        Some(t) => t.kind != TokenKind::Semicolon,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_mode_on_trailing_semicolon() {
        let mut out = Vec::new();
        let reporter = run_source("print 1 + 2;", &mut out);
        assert!(!reporter.had_error());
        assert_eq!(String::from_utf8(out).unwrap(), "3\n");
    }

    #[test]
    fn repl_single_expression_mode_prints_value() {
        let globals = Environment::global();
        let mut out = Vec::new();
        let reporter = run_repl_line("1 + 2", globals, &mut out);
        assert!(!reporter.had_error());
        assert_eq!(String::from_utf8(out).unwrap(), "3\n");
    }

    #[test]
    fn repl_retains_globals_across_inputs() {
        let globals = Environment::global();
        let mut out = Vec::new();
        run_repl_line("var x = 10;", globals.clone(), &mut out);
        let reporter = run_repl_line("x", globals, &mut out);
        assert!(!reporter.had_error());
        assert_eq!(String::from_utf8(out).unwrap(), "10\n");
    }

    #[test]
    fn compile_error_prevents_evaluation() {
        let mut out = Vec::new();
        let reporter = run_source("var = 1;", &mut out);
        assert!(reporter.had_error());
        assert_eq!(String::from_utf8(out).unwrap(), "");
    }
}
