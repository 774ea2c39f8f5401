//! git::backend
//!
//! Subprocess-backed [`ObjectStore`] implementation.
//!
//! # Architecture
//!
//! This module is the **single doorway** to the git binary. All repository
//! queries flow through [`GitBackend`], which runs `git` with an explicit
//! working directory and normalizes failures into typed [`StoreError`]
//! categories. No other module spawns processes.
//!
//! The repository location is threaded into every invocation via
//! `current_dir`; the hook never changes its own working directory.
//!
//! # Timeouts
//!
//! A hook that hangs blocks the pusher indefinitely, so every subprocess
//! call carries a bounded timeout. On expiry the child is killed and the
//! call fails with [`StoreError::BackendUnavailable`]; timeouts are never
//! retried.
//!
//! # Example
//!
//! ```ignore
//! use refgate::git::GitBackend;
//! use std::time::Duration;
//!
//! let store = GitBackend::open("/srv/git/project.git", Duration::from_secs(30))?;
//! let ty = store.object_type(&oid)?;
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::core::types::{ObjectType, Oid};

use super::store::{ObjectStore, StoreError};

/// Default per-call timeout when the config does not specify one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Captured output of one finished git invocation.
struct GitOutput {
    success: bool,
    stdout: String,
    stderr: String,
}

/// Subprocess-backed object store for one repository.
#[derive(Debug)]
pub struct GitBackend {
    /// Repository root (worktree or bare repository directory).
    repo: PathBuf,
    /// Per-invocation subprocess timeout.
    timeout: Duration,
}

impl GitBackend {
    /// Open a backend against a repository location.
    ///
    /// Validates that the directory exists and actually holds a repository
    /// before any subprocess runs, so the two conditions surface as
    /// distinct errors.
    ///
    /// # Errors
    ///
    /// - `MissingDirectory` if `repo` does not exist
    /// - `NoRepository` if it exists but is not a git repository
    pub fn open(repo: impl Into<PathBuf>, timeout: Duration) -> Result<Self, StoreError> {
        let repo = repo.into();
        if !repo.is_dir() {
            return Err(StoreError::MissingDirectory { path: repo });
        }
        if git2::Repository::open(&repo).is_err() {
            return Err(StoreError::NoRepository { path: repo });
        }
        Ok(Self { repo, timeout })
    }

    /// The repository this backend operates against.
    pub fn repo_path(&self) -> &Path {
        &self.repo
    }

    /// Run `git` with the given arguments and collect its output.
    ///
    /// Output is drained on reader threads so a chatty child cannot fill
    /// the pipe and stall; the main thread polls for exit until the
    /// deadline, then kills the child.
    ///
    /// A non-zero exit is NOT an error at this level; callers interpret
    /// the status per query.
    fn run_git(&self, args: &[&str]) -> Result<GitOutput, StoreError> {
        let command_line = format!("git {}", args.join(" "));
        let unavailable = |detail: String| StoreError::BackendUnavailable {
            command: command_line.clone(),
            detail,
        };

        let mut child = Command::new("git")
            .args(args)
            .current_dir(&self.repo)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| unavailable(e.to_string()))?;

        let stdout = match child.stdout.take() {
            Some(pipe) => drain(pipe),
            None => return Err(unavailable("stdout not captured".into())),
        };
        let stderr = match child.stderr.take() {
            Some(pipe) => drain(pipe),
            None => return Err(unavailable("stderr not captured".into())),
        };

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(unavailable(format!(
                            "timed out after {}s",
                            self.timeout.as_secs()
                        )));
                    }
                    thread::sleep(Duration::from_millis(10));
                }
                Err(e) => return Err(unavailable(e.to_string())),
            }
        };

        let stdout = stdout
            .join()
            .map_err(|_| unavailable("stdout reader panicked".into()))?
            .map_err(|e| unavailable(e.to_string()))?;
        let stderr = stderr
            .join()
            .map_err(|_| unavailable("stderr reader panicked".into()))?
            .map_err(|e| unavailable(e.to_string()))?;

        Ok(GitOutput {
            success: status.success(),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }

    /// Run a query whose non-zero exit means "tooling broke".
    fn run_expecting_success(&self, args: &[&str]) -> Result<String, StoreError> {
        let out = self.run_git(args)?;
        if !out.success {
            return Err(StoreError::BackendUnavailable {
                command: format!("git {}", args.join(" ")),
                detail: out.stderr.trim().to_string(),
            });
        }
        Ok(out.stdout)
    }
}

/// Read a pipe to the end on a background thread.
fn drain(mut pipe: impl Read + Send + 'static) -> thread::JoinHandle<std::io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)?;
        Ok(buf)
    })
}

/// Split command output into lines, keeping interior blank lines.
///
/// Blank lines are significant to the show parser (they terminate the
/// header block and the message body); only the trailing newline is
/// dropped.
fn lines_of(output: &str) -> Vec<String> {
    let trimmed = output.strip_suffix('\n').unwrap_or(output);
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.lines().map(|l| l.to_string()).collect()
}

/// Parse one oid per line.
fn oid_lines(output: &str, command: &str) -> Result<Vec<Oid>, StoreError> {
    output
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| {
            Oid::new(l.trim()).map_err(|e| StoreError::BackendUnavailable {
                command: command.to_string(),
                detail: format!("unparseable revision line: {}", e),
            })
        })
        .collect()
}

impl ObjectStore for GitBackend {
    fn object_type(&self, id: &Oid) -> Result<ObjectType, StoreError> {
        debug_assert!(!id.is_zero(), "zero oid must not reach the backend");
        let out = self.run_git(&["cat-file", "-t", id.as_str()])?;
        if !out.success {
            return Err(StoreError::InvalidObject {
                oid: id.to_string(),
            });
        }
        ObjectType::from_backend(&out.stdout).ok_or_else(|| StoreError::BackendUnavailable {
            command: format!("git cat-file -t {}", id),
            detail: format!("unrecognized object type: {}", out.stdout.trim()),
        })
    }

    fn object_exists(&self, id: &Oid) -> Result<bool, StoreError> {
        debug_assert!(!id.is_zero(), "zero oid must not reach the backend");
        let out = self.run_git(&["cat-file", "-e", id.as_str()])?;
        Ok(out.success)
    }

    fn diff_summary(&self, id: &Oid) -> Result<Vec<String>, StoreError> {
        let out = self.run_expecting_success(&[
            "show",
            "--name-status",
            "--pretty=short",
            "--date=iso8601",
            id.as_str(),
        ])?;
        Ok(lines_of(&out))
    }

    fn rev_list(&self, include: &Oid, exclude: &[String]) -> Result<Vec<Oid>, StoreError> {
        let mut args = vec!["rev-list".to_string(), "--reverse".to_string()];
        args.push(include.to_string());
        for spec in exclude {
            args.push(format!("^{}", spec));
        }
        let arg_refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
        let out = self.run_expecting_success(&arg_refs)?;
        oid_lines(&out, "git rev-list")
    }

    fn local_refs(&self) -> Result<Vec<String>, StoreError> {
        let out = self.run_expecting_success(&[
            "for-each-ref",
            "--format=%(refname)",
            "refs/heads",
            "refs/tags",
        ])?;
        Ok(out
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.trim().to_string())
            .collect())
    }

    fn branches_containing(
        &self,
        commit: &Oid,
        include_remote: bool,
    ) -> Result<Vec<String>, StoreError> {
        self.branch_query("--contains", commit, include_remote)
    }

    fn branches_not_containing(
        &self,
        commit: &Oid,
        include_remote: bool,
    ) -> Result<Vec<String>, StoreError> {
        self.branch_query("--no-contains", commit, include_remote)
    }
}

impl GitBackend {
    fn branch_query(
        &self,
        filter: &str,
        commit: &Oid,
        include_remote: bool,
    ) -> Result<Vec<String>, StoreError> {
        let mut args = vec![
            "branch",
            "--list",
            "--format=%(refname:short)",
            filter,
            commit.as_str(),
        ];
        if include_remote {
            args.push("--all");
        }
        let out = self.run_expecting_success(&args)?;
        Ok(out
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| l.trim().to_string())
            .collect())
    }
}
