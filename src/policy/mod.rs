//! policy
//!
//! Abstraction for the access policy that decides ref updates.
//!
//! # Design
//!
//! The hook classifies; the policy decides. [`PolicyEngine`] is the seam:
//! it consumes the structured [`Operation`](crate::core::types::Operation)
//! the pipeline produced and returns an allow/deny verdict with
//! human-readable diagnostics. The built-in [`RulePolicy`] covers the
//! common server-side rules from configuration; deployments with richer
//! needs implement the trait and keep the rest of the hook unchanged.

pub mod mock;
pub mod rules;
pub mod traits;

pub use rules::RulePolicy;
pub use traits::{PolicyEngine, PolicyError, Verdict};
