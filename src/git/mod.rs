//! git
//!
//! Single interface for all repository queries.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to the version-control backend. The
//! [`ObjectStore`] trait defines the query surface the hook needs;
//! [`GitBackend`] implements it by shelling out to `git` with an explicit
//! repository path and a bounded per-call timeout. No other module spawns
//! processes or touches repository internals.
//!
//! On top of the raw store sits [`ObjectDb`], the per-invocation
//! memoization layer, and [`show`], the parser for the backend's textual
//! show output.
//!
//! # Invariants
//!
//! - All queries are read-only; the hook never mutates the repository
//! - The zero oid never reaches the backend
//! - Every subprocess call is bounded by a timeout; expiry surfaces as
//!   `BackendUnavailable`

pub mod backend;
pub mod mock;
pub mod objects;
pub mod show;
pub mod store;

pub use backend::{GitBackend, DEFAULT_TIMEOUT};
pub use objects::ObjectDb;
pub use show::{parse_commit_record, status_items, CommitRecord, StatusLine};
pub use store::{ObjectStore, StoreError};
