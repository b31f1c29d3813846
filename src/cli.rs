//! CLI argument parsing for the `scriptlang` binary.

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to a script to run. If omitted, starts an interactive REPL.
    pub file: Option<std::path::PathBuf>,

    /// Specify the log level of the interpreter's internal tracing.
    #[arg(value_enum, short, long, default_value_t = LogLevel::default())]
    pub verbosity: LogLevel,

    /// Emit diagnostics as JSON Lines instead of the human-readable form.
    #[arg(long)]
    pub json_errors: bool,
}

impl Cli {
    pub fn init() -> Self {
        Cli::parse()
    }
}

/// Log level for the interpreter's own `log` tracing — unrelated to the
/// language's own compile/runtime diagnostics, which always print.
#[derive(ValueEnum, Clone, Default, Debug)]
pub enum LogLevel {
    #[default]
    #[value(alias("0"))]
    Error,
    #[value(alias("1"))]
    Warn,
    #[value(alias("2"))]
    Info,
    #[value(alias("3"))]
    Debug,
    #[value(alias("4"))]
    Trace,
}

impl From<&LogLevel> for log::Level {
    fn from(value: &LogLevel) -> Self {
        match value {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}
