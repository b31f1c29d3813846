//! Error reporting.
//!
//! Every stage of the pipeline (lexer, parser, evaluator) reports through a
//! shared [`ErrorReporter`] instead of panicking or writing to stderr
//! directly. The reporter owns the sticky `had_error`/`had_runtime_error`
//! flags described in the language design: once set, downstream stages are
//! expected to check them before consuming a stage's output.

use std::fmt::Display;

use serde::Serialize;

/// Where, within a line, a diagnostic should point. `None` for lexer errors
/// (which have no lexeme to underline yet), `Some("")` for parser errors
/// hitting end-of-input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Where {
    /// No location suffix (lexer errors).
    None,
    /// `at '<lexeme>'`.
    AtLexeme(String),
    /// `at end`.
    AtEnd,
}

impl Display for Where {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Where::None => Ok(()),
            Where::AtLexeme(lexeme) => write!(f, " at '{lexeme}'"),
            Where::AtEnd => write!(f, " at end"),
        }
    }
}

/// A single positioned diagnostic, in the shape spec'd for this language:
/// `[line L] Error<where>: <message>`, followed by the offending source
/// line and a caret indented to the column.
///
/// `Token.line` is 0-based (per the position invariant), but `line` here
/// is normalized to 1-based at construction time, since that is the
/// conventional way compiler diagnostics are shown to a user and spec.md
/// leaves the rendering basis unspecified. Both `Display` and the JSON
/// Lines encoding (`ErrorReporter::emit_json`) read this same field, so
/// the two output modes always agree on the reported line number.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub line: usize,
    pub column: usize,
    pub where_: Where,
    pub message: String,
    /// The full offending source line, kept so `Display` can render the
    /// caret without needing the original source back.
    pub source_line: String,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "[line {}] Error{}: {}", self.line, self.where_, self.message)?;
        writeln!(f, "{}", self.source_line)?;
        let indent = self.column.saturating_sub(1);
        write!(f, "{}^", " ".repeat(indent))
    }
}

/// Shared collaborator, passed by reference into the lexer, parser and
/// evaluator. Holds the sticky error flags and the diagnostics reported so
/// far for the current run.
#[derive(Default)]
pub struct ErrorReporter {
    had_error: bool,
    had_runtime_error: bool,
    diagnostics: Vec<Diagnostic>,
    source_lines: Vec<String>,
}

impl ErrorReporter {
    pub fn new(source: &str) -> Self {
        Self {
            had_error: false,
            had_runtime_error: false,
            diagnostics: vec![],
            source_lines: source.lines().map(str::to_owned).collect(),
        }
    }

    /// `line` is the 0-based line number carried by `Token`/`Diagnostic`.
    fn line_text(&self, line: usize) -> String {
        self.source_lines.get(line).cloned().unwrap_or_default()
    }

    /// Report a lexical error. Sets `had_error`.
    pub fn lex_error(&mut self, line: usize, column: usize, message: impl Into<String>) {
        self.report(line, column, Where::None, message);
    }

    /// Report a parse error at a specific token. Sets `had_error`.
    pub fn parse_error(
        &mut self,
        line: usize,
        column: usize,
        where_: Where,
        message: impl Into<String>,
    ) {
        self.report(line, column, where_, message);
    }

    /// Report a runtime error. Sets `had_runtime_error`, not `had_error`.
    /// `line` is the 0-based line carried by `Token`; it is normalized to
    /// 1-based before being stored on the `Diagnostic`.
    pub fn runtime_error(&mut self, line: usize, column: usize, message: impl Into<String>) {
        let diagnostic = Diagnostic {
            line: line + 1,
            column,
            where_: Where::None,
            message: message.into(),
            source_line: self.line_text(line),
        };
        log::error!("{diagnostic}");
        self.diagnostics.push(diagnostic);
        self.had_runtime_error = true;
    }

    /// `line` is the 0-based line carried by `Token`; it is normalized to
    /// 1-based before being stored on the `Diagnostic`.
    fn report(&mut self, line: usize, column: usize, where_: Where, message: impl Into<String>) {
        let diagnostic = Diagnostic {
            line: line + 1,
            column,
            where_,
            message: message.into(),
            source_line: self.line_text(line),
        };
        log::error!("{diagnostic}");
        self.diagnostics.push(diagnostic);
        self.had_error = true;
    }

    pub fn had_error(&self) -> bool {
        self.had_error
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Clear the sticky flags and accumulated diagnostics between REPL
    /// inputs so the session stays usable after a failed line.
    pub fn reset(&mut self) {
        self.had_error = false;
        self.had_runtime_error = false;
        self.diagnostics.clear();
    }

    /// Write the human-readable diagnostics to the given sink.
    pub fn emit_human(&self, mut sink: impl std::io::Write) {
        for diagnostic in &self.diagnostics {
            let _ = writeln!(sink, "{diagnostic}");
        }
    }

    /// Write one JSON object per diagnostic (JSON Lines) to the given sink.
    pub fn emit_json(&self, mut sink: impl std::io::Write) {
        for diagnostic in &self.diagnostics {
            if let Ok(line) = serde_json::to_string(diagnostic) {
                let _ = writeln!(sink, "{line}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_lexer_diagnostic() {
        let mut reporter = ErrorReporter::new("var x = 1\nvar y = \"oops\n");
        // line 1 is 0-based (the second source line); rendered 1-based.
        reporter.lex_error(1, 9, "Unterminated string.");
        assert!(reporter.had_error());
        let rendered = reporter.diagnostics()[0].to_string();
        assert!(rendered.starts_with("[line 2] Error: Unterminated string."));
    }

    #[test]
    fn formats_parse_diagnostic_with_lexeme() {
        let mut reporter = ErrorReporter::new("1 + ;\n");
        reporter.parse_error(0, 5, Where::AtLexeme(";".into()), "Expect expression.");
        let rendered = reporter.diagnostics()[0].to_string();
        assert!(rendered.contains("Error at ';': Expect expression."));
    }

    #[test]
    fn reset_clears_sticky_flags() {
        let mut reporter = ErrorReporter::new("");
        reporter.runtime_error(1, 1, "boom");
        assert!(reporter.had_runtime_error());
        reporter.reset();
        assert!(!reporter.had_runtime_error());
        assert!(reporter.diagnostics().is_empty());
    }
}
