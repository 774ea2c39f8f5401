//! refgate - a server-side hook that gates git ref updates
//!
//! For every reference a push wants to update, refgate turns the raw
//! `<ref> <old> <new>` triple into a fully classified description of what
//! happened - which commits are new, whether this is a commit push, tag,
//! branch creation or deletion, which paths changed and how - and asks an
//! access policy to allow or deny the update before git applies it.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Parses arguments, maps failures to exit codes
//! - [`hook`] - Classification pipeline and per-ref gating
//! - [`core`] - Domain types and configuration
//! - [`git`] - Single interface for all repository queries
//! - [`policy`] - Abstraction for the access policy, plus built-in rules
//! - [`ui`] - Output utilities
//!
//! # Correctness Invariants
//!
//! 1. The hook never mutates the repository; every backend query is
//!    read-only
//! 2. A fatal classification failure sends nothing to the policy engine
//!    and is never downgraded to an allow
//! 3. The zero object id is a sentinel and never reaches the backend
//! 4. Exit code zero is the only outcome that applies an update

pub mod cli;
pub mod core;
pub mod git;
pub mod hook;
pub mod policy;
pub mod ui;
