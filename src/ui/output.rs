//! ui::output
//!
//! Output formatting for a hook that talks to a pushing user.
//!
//! # Design
//!
//! Everything user-facing goes to stderr; git relays the hook's stderr to
//! the pusher. Stdout is reserved for `--json` machine output. Messages
//! respect the quiet flag, except errors and denial diagnostics, which
//! are always shown.

use std::fmt::Display;

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - minimal output
    Quiet,
    /// Normal mode - standard output
    Normal,
    /// Debug mode - verbose output
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }
}

/// Print a message (respects quiet mode).
pub fn print(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("{}", message);
    }
}

/// Print a debug message (only in debug mode).
pub fn debug(message: impl Display, verbosity: Verbosity) {
    if verbosity == Verbosity::Debug {
        eprintln!("[debug] {}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}

/// Print a warning message (respects quiet mode).
pub fn warn(message: impl Display, verbosity: Verbosity) {
    if verbosity != Verbosity::Quiet {
        eprintln!("warning: {}", message);
    }
}

/// Format denial diagnostics as one block.
///
/// Messages are separated by blank lines so multi-rule denials read as
/// distinct paragraphs on the pusher's terminal.
pub fn denial_block(refname: &str, messages: &[String]) -> String {
    if messages.is_empty() {
        return format!("access denied for {}", refname);
    }
    format!(
        "access denied for {}:\n\n{}",
        refname,
        messages.join("\n\n")
    )
}
