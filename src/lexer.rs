//! Single-pass lexer.
//!
//! Converts a source string into a finite token sequence terminated by an
//! `EOF` sentinel. Never fails fatally: malformed input is reported through
//! the shared [`ErrorReporter`] and scanning continues, so later errors in
//! the same source are also surfaced.

use std::{iter::Peekable, str::Chars};

use crate::error::ErrorReporter;
use crate::token::{keyword_kind, Literal, Token, TokenKind};

pub struct Lexer<'a> {
    source: &'a str,
    chars: Peekable<Chars<'a>>,
    tokens: Vec<Token>,
    /// 0-based line of the character about to be read.
    line: usize,
    /// 1-based column of the character about to be read.
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().peekable(),
            tokens: vec![],
            line: 0,
            column: 1,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn advance(&mut self) -> Option<char> {
        let next = self.chars.next();
        if let Some(c) = next {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        next
    }

    fn matches(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Scan the whole source, reporting errors into `reporter` as they are
    /// found, and always returning a complete token stream (ending in
    /// `EOF`) even when errors occurred.
    pub fn scan(mut self, reporter: &mut ErrorReporter) -> Vec<Token> {
        self.line = 0;
        loop {
            let Some(c) = self.peek() else { break };
            let start_line = self.line;
            let start_column = self.column;
            self.advance();
            self.scan_token(c, start_line, start_column, reporter);
        }

        let eof_column = self.column;
        self.tokens
            .push(Token::new(TokenKind::Eof, "", None, self.line, eof_column));
        log::trace!("lexed {} tokens", self.tokens.len());
        self.tokens
    }

    fn push(&mut self, kind: TokenKind, lexeme: String, line: usize, column: usize) {
        log::trace!("token {kind:?} '{lexeme}' at {line}:{column}");
        self.tokens.push(Token::new(kind, lexeme, None, line, column));
    }

    fn scan_token(
        &mut self,
        c: char,
        line: usize,
        column: usize,
        reporter: &mut ErrorReporter,
    ) {
        use TokenKind::*;
        match c {
            '(' => self.push(LeftParen, c.to_string(), line, column),
            ')' => self.push(RightParen, c.to_string(), line, column),
            '{' => self.push(LeftBrace, c.to_string(), line, column),
            '}' => self.push(RightBrace, c.to_string(), line, column),
            ',' => self.push(Comma, c.to_string(), line, column),
            '.' => self.push(Dot, c.to_string(), line, column),
            '-' => self.push(Minus, c.to_string(), line, column),
            '+' => self.push(Plus, c.to_string(), line, column),
            ';' => self.push(Semicolon, c.to_string(), line, column),
            '*' => self.push(Star, c.to_string(), line, column),
            '!' => {
                if self.matches('=') {
                    self.push(BangEqual, "!=".into(), line, column);
                } else {
                    self.push(Bang, "!".into(), line, column);
                }
            }
            '=' => {
                if self.matches('=') {
                    self.push(EqualEqual, "==".into(), line, column);
                } else {
                    self.push(Equal, "=".into(), line, column);
                }
            }
            '<' => {
                if self.matches('=') {
                    self.push(LessEqual, "<=".into(), line, column);
                } else {
                    self.push(Less, "<".into(), line, column);
                }
            }
            '>' => {
                if self.matches('=') {
                    self.push(GreaterEqual, ">=".into(), line, column);
                } else {
                    self.push(Greater, ">".into(), line, column);
                }
            }
            '/' => {
                if self.matches('/') {
                    while let Some(next) = self.peek() {
                        if next == '\n' {
                            break;
                        }
                        self.advance();
                    }
                } else {
                    self.push(Slash, "/".into(), line, column);
                }
            }
            ' ' | '\r' | '\t' | '\n' => {}
            '"' => self.scan_string(line, column, reporter),
            '0'..='9' => self.scan_number(c, line, column, reporter),
            c if is_ident_start(c) => self.scan_identifier(c, line, column),
            other => {
                reporter.lex_error(line, column, "Unexpected character.");
                log::debug!("skipped unexpected character '{other}' at {line}:{column}");
            }
        }
    }

    /// Scans a quote-delimited string verbatim: the literal's value is
    /// exactly the characters between the quotes, with no backslash-escape
    /// processing. An embedded literal newline advances the line counter
    /// and is kept in the value.
    fn scan_string(&mut self, line: usize, column: usize, reporter: &mut ErrorReporter) {
        let mut raw = String::new();
        loop {
            match self.peek() {
                None => {
                    reporter.lex_error(line, column, "Unterminated string.");
                    return;
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some(next) => {
                    raw.push(next);
                    self.advance();
                }
            }
        }

        let lexeme = format!("\"{raw}\"");
        self.tokens.push(Token::new(
            TokenKind::String,
            lexeme,
            Some(Literal::Str(raw)),
            line,
            column,
        ));
    }

    fn scan_number(
        &mut self,
        first: char,
        line: usize,
        column: usize,
        reporter: &mut ErrorReporter,
    ) {
        let mut lexeme = String::from(first);
        let mut dot_count = if first == '.' { 1 } else { 0 };

        while let Some(next) = self.peek() {
            match next {
                '0'..='9' => {
                    lexeme.push(next);
                    self.advance();
                }
                '.' => {
                    dot_count += 1;
                    if dot_count > 1 {
                        reporter.lex_error(line, column, "Multiple decimal points in number.");
                    }
                    lexeme.push(next);
                    self.advance();
                }
                _ => break,
            }
        }

        // A malformed run (more than one '.') can't parse as f64; fall back
        // to the leading well-formed prefix so scanning keeps making
        // progress and later tokens still get sensible positions.
        let value: f64 = lexeme.parse().unwrap_or_else(|_| {
            let first_dot = lexeme.find('.');
            let second_dot = first_dot.and_then(|i| lexeme[i + 1..].find('.').map(|j| i + 1 + j));
            let prefix = second_dot.map(|i| &lexeme[..i]).unwrap_or(&lexeme);
            prefix.parse().unwrap_or(0.0)
        });
        self.tokens.push(Token::new(
            TokenKind::Number,
            lexeme,
            Some(Literal::Number(value)),
            line,
            column,
        ));
    }

    fn scan_identifier(&mut self, first: char, line: usize, column: usize) {
        let mut lexeme = String::from(first);

        while let Some(next) = self.peek() {
            if is_ident_continue(next) {
                lexeme.push(next);
                self.advance();
            } else {
                break;
            }
        }

        let kind = keyword_kind(&lexeme).unwrap_or(TokenKind::Identifier);
        self.push(kind, lexeme, line, column);
    }
}

fn is_ident_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_ident_continue(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> (Vec<Token>, bool) {
        let mut reporter = ErrorReporter::new(source);
        let tokens = Lexer::new(source).scan(&mut reporter);
        (tokens, reporter.had_error())
    }

    #[test]
    fn lexes_punctuation_and_operators() {
        let (tokens, had_error) = scan("(){};==!=<=>=");
        assert!(!had_error);
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        use TokenKind::*;
        assert_eq!(
            kinds,
            vec![
                LeftParen, RightParen, LeftBrace, RightBrace, Semicolon, EqualEqual, BangEqual,
                LessEqual, GreaterEqual, Eof
            ]
        );
    }

    #[test]
    fn lexes_number_literal() {
        let (tokens, _) = scan("12.5");
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].literal, Some(Literal::Number(12.5)));
    }

    #[test]
    fn whole_number_has_no_fractional_literal_issue() {
        let (tokens, _) = scan("7");
        assert_eq!(tokens[0].literal, Some(Literal::Number(7.0)));
    }

    #[test]
    fn second_dot_in_same_numeric_run_is_an_error() {
        let (tokens, had_error) = scan("1.2.3");
        assert!(had_error);
        // Scanning still makes progress and produces one Number token.
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[1].kind, TokenKind::Eof);
    }

    #[test]
    fn identifier_vs_keyword() {
        let (tokens, _) = scan("forest for");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].kind, TokenKind::For);
    }

    #[test]
    fn unterminated_string_reports_error() {
        let (_, had_error) = scan("\"hello");
        assert!(had_error);
    }

    #[test]
    fn string_spanning_newlines_advances_line() {
        let (tokens, had_error) = scan("\"a\nb\" x");
        assert!(!had_error);
        assert_eq!(tokens[0].literal, Some(Literal::Str("a\nb".into())));
        assert_eq!(tokens[1].line, 1);
    }

    #[test]
    fn backslash_escapes_are_kept_literal_not_decoded() {
        let (tokens, had_error) = scan(r#""a\nb""#);
        assert!(!had_error);
        assert_eq!(tokens[0].literal, Some(Literal::Str("a\\nb".into())));
    }

    #[test]
    fn unexpected_character_is_skipped_and_reported() {
        let (tokens, had_error) = scan("1 @ 2");
        assert!(had_error);
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        use TokenKind::*;
        assert_eq!(kinds, vec![Number, Number, Eof]);
    }

    #[test]
    fn line_comment_runs_to_newline() {
        let (tokens, _) = scan("1 // comment\n2");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        use TokenKind::*;
        assert_eq!(kinds, vec![Number, Number, Eof]);
        assert_eq!(tokens[1].line, 1);
    }

    #[test]
    fn eof_column_is_one_past_last_column() {
        let (tokens, _) = scan("ab");
        let eof = tokens.last().unwrap();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.column, 3);
    }
}
