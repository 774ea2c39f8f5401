//! git::store
//!
//! The abstract query surface the hook needs from a repository backend.
//!
//! # Design
//!
//! [`ObjectStore`] is the seam between the classification pipeline and the
//! version-control backend. The production implementation
//! ([`crate::git::GitBackend`]) shells out to `git`; tests substitute
//! [`crate::git::mock::MockStore`], which serves canned answers and counts
//! calls.
//!
//! Implementations answer point queries only. Memoization lives above this
//! trait, in [`crate::git::ObjectDb`], so a fake store sees exactly one
//! call per distinct question.
//!
//! The zero oid is never passed to any method here; callers resolve it to
//! [`ObjectType::Empty`](crate::core::types::ObjectType::Empty) without a
//! backend round trip.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::types::{ObjectType, Oid};

/// Errors from backend queries.
///
/// The taxonomy keeps "bad input" (`InvalidObject`, `UnexpectedType`)
/// distinct from "tooling broke" (`BackendUnavailable`) so operators can
/// tell them apart from the exit code alone.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The object id does not exist in the repository.
    #[error("object not found in repository: {oid}")]
    InvalidObject {
        /// The object id that failed to resolve
        oid: String,
    },

    /// The object exists but is not of an allowed type for this operation.
    #[error("expected {oid} to be one of {expected}, is {actual}")]
    UnexpectedType {
        /// The object id in question
        oid: String,
        /// Human-readable list of allowed types
        expected: String,
        /// The type the backend reported
        actual: ObjectType,
    },

    /// The backend subprocess failed, timed out, or produced unreadable
    /// output.
    #[error("backend unavailable: {command}: {detail}")]
    BackendUnavailable {
        /// The command that failed
        command: String,
        /// What went wrong
        detail: String,
    },

    /// The configured repository directory does not exist.
    #[error("repository directory missing: {path}")]
    MissingDirectory {
        /// The path that was checked
        path: PathBuf,
    },

    /// The directory exists but holds no repository.
    #[error("no repository found at: {path}")]
    NoRepository {
        /// The path that was searched
        path: PathBuf,
    },
}

/// Backend query surface for one repository.
///
/// All methods are read-only; the hook never mutates the repository.
pub trait ObjectStore {
    /// Resolve the type of an object.
    ///
    /// # Errors
    ///
    /// `InvalidObject` if the id does not exist in the repository.
    fn object_type(&self, id: &Oid) -> Result<ObjectType, StoreError>;

    /// Whether an object exists in the repository.
    fn object_exists(&self, id: &Oid) -> Result<bool, StoreError>;

    /// The textual show output for a commit or tag object: headers, message
    /// body, and the trailing name-status section, as raw non-empty lines.
    fn diff_summary(&self, id: &Oid) -> Result<Vec<String>, StoreError>;

    /// Commits reachable from `include` but from none of `exclude`,
    /// oldest first.
    ///
    /// `exclude` entries may be object ids or ref names; they are passed to
    /// the backend as negated revision specs.
    fn rev_list(&self, include: &Oid, exclude: &[String]) -> Result<Vec<Oid>, StoreError>;

    /// Full names of all local branch and tag refs, in backend order.
    fn local_refs(&self) -> Result<Vec<String>, StoreError>;

    /// Branches whose history contains `commit`.
    fn branches_containing(
        &self,
        commit: &Oid,
        include_remote: bool,
    ) -> Result<Vec<String>, StoreError>;

    /// Branches whose history does not contain `commit`.
    fn branches_not_containing(
        &self,
        commit: &Oid,
        include_remote: bool,
    ) -> Result<Vec<String>, StoreError>;
}
