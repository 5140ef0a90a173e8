//! Structured, leveled logging setup shared by every binary in the workspace.
//!
//! Wraps `slog`/`sloggers` into a single `init()` entry point that builds a
//! terminal logger writing structured key-value records, rather than ad-hoc
//! `println!` calls, so call sites never need to name `slog` directly.
pub use slog::{debug, error, info, o, trace, warn, Discard, Drain, Logger};
pub use sloggers::types::Severity;

use sloggers::terminal::{Destination, TerminalLoggerBuilder};
use sloggers::Build;

/// Builds the root logger for the process. Terminal output goes to stderr so that
/// stdout stays free for any future protocol-facing output.
pub fn init(level: Severity) -> Logger {
    let mut builder = TerminalLoggerBuilder::new();
    builder.level(level);
    builder.destination(Destination::Stderr);

    builder
        .build()
        .unwrap_or_else(|_| Logger::root(Discard, o!()))
}

/// A logger that discards everything, used where no logger has been wired up (tests).
pub fn discard() -> Logger {
    Logger::root(Discard, o!())
}
