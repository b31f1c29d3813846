//! Tree-walking evaluator.
//!
//! Executes a statement sequence against an [`Environment`] chain and
//! evaluates expressions into [`Value`]s. Control-flow (`break`/`continue`)
//! is modelled as an explicit outcome of statement execution rather than as
//! exceptions — `execute` returns `Result<Signal, RuntimeError>`, and
//! blocks/loops pattern-match on the `Signal` to decide whether to keep
//! going, stop, or propagate it further out.

use std::io::Write;

use crate::ast::{Expr, Stmt};
use crate::environment::Environment;
use crate::error::ErrorReporter;
use crate::token::{Token, TokenKind};
use crate::value::Value;

/// The outcome of executing a statement, besides an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Normal,
    Break,
    Continue,
}

/// A runtime error, carrying the offending operator or name token so the
/// reporter can point at its position.
#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl RuntimeError {
    fn new(token: &Token, message: impl Into<String>) -> Self {
        Self {
            token: token.clone(),
            message: message.into(),
        }
    }
}

type EvalResult<T> = Result<T, RuntimeError>;

pub struct Interpreter<'w> {
    globals: Environment,
    stdout: &'w mut dyn Write,
}

impl<'w> Interpreter<'w> {
    pub fn new(stdout: &'w mut dyn Write) -> Self {
        Self {
            globals: Environment::global(),
            stdout,
        }
    }

    /// Reuse the same global environment across calls, enabling the
    /// cumulative state a REPL session relies on.
    pub fn globals(&self) -> Environment {
        self.globals.clone()
    }

    pub fn with_globals(stdout: &'w mut dyn Write, globals: Environment) -> Self {
        Self { globals, stdout }
    }

    /// Execute a full statement sequence (script mode). A runtime error
    /// aborts remaining top-level statements and is reported; a stray
    /// `break`/`continue` that escapes every enclosing loop is silently
    /// dropped, matching the source's undefined-but-tolerated behavior.
    pub fn run(&mut self, statements: &[Stmt], reporter: &mut ErrorReporter) {
        let env = self.globals.clone();
        for stmt in statements {
            match self.execute(stmt, &env) {
                Ok(_) => {}
                Err(err) => {
                    reporter.runtime_error(err.token.line, err.token.column, err.message);
                    return;
                }
            }
        }
    }

    /// Evaluate a single expression (interactive single-expression mode)
    /// and print its stringified result.
    pub fn run_expression(&mut self, expr: &Expr, reporter: &mut ErrorReporter) {
        let env = self.globals.clone();
        match self.evaluate(expr, &env) {
            Ok(value) => {
                let _ = writeln!(self.stdout, "{value}");
            }
            Err(err) => reporter.runtime_error(err.token.line, err.token.column, err.message),
        }
    }

    fn execute(&mut self, stmt: &Stmt, env: &Environment) -> EvalResult<Signal> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr, env)?;
                Ok(Signal::Normal)
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr, env)?;
                let _ = writeln!(self.stdout, "{value}");
                Ok(Signal::Normal)
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr, env)?,
                    None => Value::Nil,
                };
                env.define(&name.lexeme, value);
                Ok(Signal::Normal)
            }
            Stmt::Block(statements) => self.execute_block(statements, &env.child()),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition, env)?.is_truthy() {
                    self.execute(then_branch, env)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch, env)
                } else {
                    Ok(Signal::Normal)
                }
            }
            Stmt::While { condition, body } => self.execute_while(condition, body, env),
            Stmt::For {
                initializer,
                condition,
                increment,
                body,
            } => self.execute_for(initializer, condition, increment, body, env),
            Stmt::Break => Ok(Signal::Break),
            Stmt::Continue => Ok(Signal::Continue),
        }
    }

    fn execute_block(&mut self, statements: &[Stmt], block_env: &Environment) -> EvalResult<Signal> {
        for stmt in statements {
            let signal = self.execute(stmt, block_env)?;
            if signal != Signal::Normal {
                return Ok(signal);
            }
        }
        Ok(Signal::Normal)
    }

    fn execute_while(&mut self, condition: &Expr, body: &Stmt, env: &Environment) -> EvalResult<Signal> {
        while self.evaluate(condition, env)?.is_truthy() {
            match self.execute(body, env)? {
                Signal::Break => break,
                Signal::Continue | Signal::Normal => {}
            }
        }
        Ok(Signal::Normal)
    }

    fn execute_for(
        &mut self,
        initializer: &Option<Box<Stmt>>,
        condition: &Option<Expr>,
        increment: &Option<Expr>,
        body: &Stmt,
        env: &Environment,
    ) -> EvalResult<Signal> {
        let loop_env = env.child();
        if let Some(initializer) = initializer {
            self.execute(initializer, &loop_env)?;
        }

        loop {
            if let Some(condition) = condition {
                if !self.evaluate(condition, &loop_env)?.is_truthy() {
                    break;
                }
            }

            match self.execute(body, &loop_env)? {
                Signal::Break => break,
                Signal::Continue | Signal::Normal => {}
            }

            if let Some(increment) = increment {
                self.evaluate(increment, &loop_env)?;
            }
        }

        Ok(Signal::Normal)
    }

    fn evaluate(&mut self, expr: &Expr, env: &Environment) -> EvalResult<Value> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Grouping(inner) => self.evaluate(inner, env),
            Expr::Variable(name) => env
                .get(&name.lexeme)
                .ok_or_else(|| undefined_variable(name)),
            Expr::Assign { name, value } => {
                let value = self.evaluate(value, env)?;
                if env.assign(&name.lexeme, value.clone()) {
                    Ok(value)
                } else {
                    Err(undefined_variable(name))
                }
            }
            Expr::Unary { op, operand } => self.evaluate_unary(op, operand, env),
            Expr::Binary { lhs, op, rhs } => self.evaluate_binary(lhs, op, rhs, env),
            Expr::Logical { lhs, op, rhs } => self.evaluate_logical(lhs, op, rhs, env),
        }
    }

    fn evaluate_unary(&mut self, op: &Token, operand: &Expr, env: &Environment) -> EvalResult<Value> {
        let value = self.evaluate(operand, env)?;
        match op.kind {
            TokenKind::Minus => match value {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(RuntimeError::new(op, "Operand must be a number.")),
            },
            TokenKind::Bang => Ok(Value::Bool(!value.is_truthy())),
            _ => unreachable!("unary parser never produces this operator"),
        }
    }

    fn evaluate_logical(&mut self, lhs: &Expr, op: &Token, rhs: &Expr, env: &Environment) -> EvalResult<Value> {
        let left = self.evaluate(lhs, env)?;
        match op.kind {
            TokenKind::Or => {
                if left.is_truthy() {
                    Ok(left)
                } else {
                    self.evaluate(rhs, env)
                }
            }
            TokenKind::And => {
                if !left.is_truthy() {
                    Ok(left)
                } else {
                    self.evaluate(rhs, env)
                }
            }
            _ => unreachable!("logical parser never produces this operator"),
        }
    }

    fn evaluate_binary(&mut self, lhs: &Expr, op: &Token, rhs: &Expr, env: &Environment) -> EvalResult<Value> {
        let left = self.evaluate(lhs, env)?;
        let right = self.evaluate(rhs, env)?;

        use TokenKind::*;
        match op.kind {
            Plus => match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::Str(_), _) | (_, Value::Str(_)) => {
                    Ok(Value::Str(format!("{left}{right}")))
                }
                _ => Err(RuntimeError::new(op, "Operand(s) must be number(s).")),
            },
            Minus => numeric_binop(op, &left, &right, |a, b| a - b),
            Star => numeric_binop(op, &left, &right, |a, b| a * b),
            Slash => numeric_binop(op, &left, &right, |a, b| a / b),
            Greater => numeric_compare(op, &left, &right, |a, b| a > b),
            GreaterEqual => numeric_compare(op, &left, &right, |a, b| a >= b),
            Less => numeric_compare(op, &left, &right, |a, b| a < b),
            LessEqual => numeric_compare(op, &left, &right, |a, b| a <= b),
            EqualEqual => Ok(Value::Bool(left.is_equal(&right))),
            BangEqual => Ok(Value::Bool(!left.is_equal(&right))),
            _ => unreachable!("binary parser never produces this operator"),
        }
    }
}

fn undefined_variable(name: &Token) -> RuntimeError {
    RuntimeError::new(name, format!("Undefined variable '{}'.", name.lexeme))
}

fn numeric_binop(
    op: &Token,
    left: &Value,
    right: &Value,
    f: impl FnOnce(f64, f64) -> f64,
) -> EvalResult<Value> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(f(*a, *b))),
        _ => Err(RuntimeError::new(op, "Operand(s) must be number(s).")),
    }
}

fn numeric_compare(
    op: &Token,
    left: &Value,
    right: &Value,
    f: impl FnOnce(f64, f64) -> bool,
) -> EvalResult<Value> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(f(*a, *b))),
        _ => Err(RuntimeError::new(op, "Operand(s) must be number(s).")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn run_source(source: &str) -> (String, bool) {
        let mut reporter = ErrorReporter::new(source);
        let tokens = Lexer::new(source).scan(&mut reporter);
        let statements = Parser::new(tokens, &mut reporter).parse_program();
        let mut out = Vec::new();
        {
            let mut interpreter = Interpreter::new(&mut out);
            interpreter.run(&statements, &mut reporter);
        }
        (String::from_utf8(out).unwrap(), reporter.had_runtime_error())
    }

    #[test]
    fn prints_arithmetic_result() {
        let (out, had_error) = run_source("print 1 + 2;");
        assert!(!had_error);
        assert_eq!(out, "3\n");
    }

    #[test]
    fn string_concatenation() {
        let (out, _) = run_source("var a = \"Hello, \"; var b = \"world\"; print a + b;");
        assert_eq!(out, "Hello, world\n");
    }

    #[test]
    fn block_scoping_shadows_and_restores() {
        let (out, _) = run_source("var a = 1; { var a = 2; print a; } print a;");
        assert_eq!(out, "2\n1\n");
    }

    #[test]
    fn for_loop_prints_sequence() {
        let (out, _) = run_source("for (var i = 0; i < 3; i = i + 1) print i;");
        assert_eq!(out, "0\n1\n2\n");
    }

    #[test]
    fn logical_operators_pass_through_original_operand() {
        let (out, _) = run_source("print \"a\" and 2; print nil or \"b\";");
        assert_eq!(out, "2\nb\n");
    }

    #[test]
    fn plus_coerces_non_string_operand_to_string() {
        let (out, _) = run_source("print 1 + \"x\";");
        assert_eq!(out, "1x\n");
    }

    #[test]
    fn unary_minus_on_string_is_runtime_error() {
        let (_, had_error) = run_source("-\"x\";");
        assert!(had_error);
    }

    #[test]
    fn break_exits_innermost_loop() {
        let (out, _) = run_source(
            "for (var i = 0; i < 5; i = i + 1) { if (i == 2) break; print i; }",
        );
        assert_eq!(out, "0\n1\n");
    }

    #[test]
    fn continue_skips_to_next_iteration_running_increment_first() {
        let (out, _) = run_source(
            "for (var i = 0; i < 4; i = i + 1) { if (i == 1) continue; print i; }",
        );
        assert_eq!(out, "0\n2\n3\n");
    }

    #[test]
    fn break_outside_loop_is_a_silent_no_op() {
        let (out, had_error) = run_source("break; print 1;");
        // `break` at top level is never consumed by a loop; the signal is
        // simply ignored and execution carries on to the next statement.
        assert!(!had_error);
        assert_eq!(out, "1\n");
    }

    #[test]
    fn undefined_variable_is_runtime_error() {
        let (_, had_error) = run_source("print missing;");
        assert!(had_error);
    }

    #[test]
    fn deeply_nested_blocks_do_not_corrupt_scope() {
        let mut source = String::from("var x = 0;\n");
        for _ in 0..100 {
            source.push('{');
        }
        source.push_str("x = 1;\n");
        for _ in 0..100 {
            source.push('}');
        }
        source.push_str("print x;\n");
        let (out, had_error) = run_source(&source);
        assert!(!had_error);
        assert_eq!(out, "1\n");
    }

    #[test]
    fn division_by_zero_yields_infinity_not_an_error() {
        let (out, had_error) = run_source("print 1 / 0;");
        assert!(!had_error);
        assert_eq!(out, "inf\n");
    }
}
