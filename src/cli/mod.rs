//! cli
//!
//! Command-line layer: parse arguments, wire the pipeline, map failures
//! onto the process exit surface.
//!
//! # Responsibilities
//!
//! - Parse arguments and read ref updates (argv triple or stdin batch)
//! - Load configuration and open the repository backend
//! - Delegate every decision to [`crate::hook`]
//! - Convert typed failures into exit codes; nothing below this layer
//!   ever terminates the process
//!
//! # Exit codes
//!
//! Zero allows the update. Any non-zero code denies it; the distinct
//! values let operators tell bad input from broken tooling from a plain
//! policy denial. See [`exit`].

pub mod args;

pub use args::Cli;

use std::io::BufRead;
use std::path::PathBuf;

use clap::Parser;

use crate::core::config::{self, ConfigError};
use crate::core::types::{Oid, TypeError};
use crate::git::{GitBackend, StoreError, DEFAULT_TIMEOUT};
use crate::hook::{self, HookError, RefOutcome, RefUpdate};
use crate::policy::{PolicyError, RulePolicy};
use crate::ui::output::{self, Verbosity};

/// Process exit codes.
///
/// The update is applied only on [`exit::ALLOWED`].
pub mod exit {
    /// Update allowed.
    pub const ALLOWED: i32 = 0;
    /// Wrong argument count or usage error.
    pub const USAGE: i32 = 1;
    /// Missing or unreadable configuration.
    pub const NO_CONFIG: i32 = 2;
    /// No acting account could be resolved.
    pub const NO_ACCOUNT: i32 = 3;
    /// Repository directory missing.
    pub const NO_GIT_DIR: i32 = 4;
    /// Invalid reference.
    pub const INVALID_REF: i32 = 5;
    /// Unexpected object type.
    pub const UNEXPECTED_TYPE: i32 = 6;
    /// Access denied by policy.
    pub const NO_ACCESS: i32 = 7;
    /// Backend subprocess failed or timed out.
    pub const BACKEND_UNAVAILABLE: i32 = 8;
    /// No repository found at the given location.
    pub const NO_REPOSITORY: i32 = 9;
    /// Object id does not exist (or is not an object id at all).
    pub const INVALID_OBJECT: i32 = 10;
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`. Returns the
/// process exit code.
pub fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            use clap::error::ErrorKind;
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => exit::ALLOWED,
                _ => exit::USAGE,
            };
            let _ = err.print();
            return code;
        }
    };

    match execute(&cli) {
        Ok(code) => code,
        Err(failure) => {
            output::error(&failure.message);
            failure.code
        }
    }
}

/// A fatal condition with its exit code.
#[derive(Debug)]
struct Failure {
    code: i32,
    message: String,
}

impl Failure {
    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

fn execute(cli: &Cli) -> Result<i32, Failure> {
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);

    let updates = read_updates(cli)?;
    if updates.is_empty() {
        // A pre-receive invocation with nothing to decide.
        return Ok(exit::ALLOWED);
    }

    // Server-side hooks run with the repository as the working directory;
    // an explicit --repository or config value overrides that.
    let discovery_root = cli
        .repository
        .clone()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let loaded = config::load(cli.config.as_deref(), Some(&discovery_root))
        .map_err(|e| Failure::new(config_code(&e), e.to_string()))?;
    let config = loaded.config;
    if let Some(path) = &loaded.path {
        output::debug(format!("config loaded from {}", path.display()), verbosity);
    }

    let repo_root = cli
        .repository
        .clone()
        .or_else(|| config.repository.as_ref().map(PathBuf::from))
        .unwrap_or(discovery_root);
    let timeout = config
        .backend_timeout_secs
        .map(std::time::Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);

    let backend = GitBackend::open(&repo_root, timeout)
        .map_err(|e| Failure::new(store_code(&e), e.to_string()))?;
    let policy = RulePolicy::new(config.policy(), &backend);

    let outcomes = hook::evaluate_updates(
        &config,
        &backend,
        &policy,
        cli.pusher.as_deref(),
        &updates,
    );

    report(&outcomes, cli.json, verbosity);
    Ok(conclude(&outcomes))
}

/// Read updates from argv (update hook) or stdin (pre-receive hook).
fn read_updates(cli: &Cli) -> Result<Vec<RefUpdate>, Failure> {
    if cli.stdin {
        let stdin = std::io::stdin();
        let mut updates = Vec::new();
        for line in stdin.lock().lines() {
            let line = line
                .map_err(|e| Failure::new(exit::USAGE, format!("failed to read stdin: {}", e)))?;
            if line.trim().is_empty() {
                continue;
            }
            updates.push(parse_stdin_line(&line)?);
        }
        return Ok(updates);
    }

    match (&cli.refname, &cli.old, &cli.new) {
        (Some(refname), Some(old), Some(new)) => Ok(vec![RefUpdate {
            refname: refname.clone(),
            old: parse_oid(old)?,
            new: parse_oid(new)?,
        }]),
        _ => Err(Failure::new(
            exit::USAGE,
            "expected <ref> <old> <new> arguments or --stdin",
        )),
    }
}

/// Parse one pre-receive line: `<old> <new> <ref>`.
fn parse_stdin_line(line: &str) -> Result<RefUpdate, Failure> {
    let mut fields = line.split_whitespace();
    match (fields.next(), fields.next(), fields.next(), fields.next()) {
        (Some(old), Some(new), Some(refname), None) => Ok(RefUpdate {
            refname: refname.to_string(),
            old: parse_oid(old)?,
            new: parse_oid(new)?,
        }),
        _ => Err(Failure::new(
            exit::USAGE,
            format!("malformed update line: {}", line),
        )),
    }
}

fn parse_oid(text: &str) -> Result<Oid, Failure> {
    Oid::new(text).map_err(|e: TypeError| Failure::new(exit::INVALID_OBJECT, e.to_string()))
}

/// Print every outcome: denial blocks and errors to stderr, the JSON
/// report to stdout when requested.
fn report(outcomes: &[RefOutcome], json: bool, verbosity: Verbosity) {
    for outcome in outcomes {
        match &outcome.result {
            Ok(decision) if decision.allowed => {
                let note = if decision.bypassed {
                    " (allow-listed)"
                } else {
                    ""
                };
                output::debug(
                    format!("allowed {}{}", outcome.update.refname, note),
                    verbosity,
                );
            }
            Ok(decision) => {
                eprintln!(
                    "{}\n",
                    crate::ui::denial_block(&outcome.update.refname, &decision.messages)
                );
            }
            Err(err) => {
                output::error(format!("{}: {}", outcome.update.refname, err));
            }
        }
    }

    if json {
        let report: Vec<serde_json::Value> = outcomes
            .iter()
            .map(|outcome| match &outcome.result {
                Ok(decision) => serde_json::json!({
                    "ref": outcome.update.refname,
                    "decision": decision,
                }),
                Err(err) => serde_json::json!({
                    "ref": outcome.update.refname,
                    "error": err.to_string(),
                }),
            })
            .collect();
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(err) => output::error(format!("failed to serialize report: {}", err)),
        }
    }
}

/// Fold the batch into one exit code: the first fatal failure wins,
/// otherwise any denial, otherwise allowed.
fn conclude(outcomes: &[RefOutcome]) -> i32 {
    for outcome in outcomes {
        if let Err(err) = &outcome.result {
            return hook_code(err);
        }
    }
    if outcomes
        .iter()
        .any(|o| !o.result.as_ref().map(|d| d.allowed).unwrap_or(true))
    {
        return exit::NO_ACCESS;
    }
    exit::ALLOWED
}

fn config_code(_err: &ConfigError) -> i32 {
    exit::NO_CONFIG
}

fn store_code(err: &StoreError) -> i32 {
    match err {
        StoreError::InvalidObject { .. } => exit::INVALID_OBJECT,
        StoreError::UnexpectedType { .. } => exit::UNEXPECTED_TYPE,
        StoreError::BackendUnavailable { .. } => exit::BACKEND_UNAVAILABLE,
        StoreError::MissingDirectory { .. } => exit::NO_GIT_DIR,
        StoreError::NoRepository { .. } => exit::NO_REPOSITORY,
    }
}

fn hook_code(err: &HookError) -> i32 {
    match err {
        HookError::InvalidRef { .. } => exit::INVALID_REF,
        HookError::MissingAccount { .. } => exit::NO_ACCOUNT,
        HookError::Store(store) => store_code(store),
        HookError::Policy(PolicyError::Store(store)) => store_code(store),
        HookError::Policy(PolicyError::Internal(_)) => exit::BACKEND_UNAVAILABLE,
    }
}
